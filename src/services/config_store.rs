// Configuration Storage Service
// Handles config file read/write, version backup and runtime strategy state

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::RuntimeConfig;

const MAX_BACKUPS: usize = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            detection: DetectionConfig::default(),
            providers: HashMap::new(),
            api_keys: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally reachable base URL, used for provider webhooks.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    #[serde(default)]
    pub use_multi_api: bool,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_max_content")]
    pub max_content_chars: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            use_multi_api: false,
            request_timeout_secs: default_timeout(),
            openai_model: default_openai_model(),
            max_content_chars: default_max_content(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
}

fn default_version() -> String { "1.0.0".to_string() }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3000 }
fn default_timeout() -> u64 { 30 }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_max_content() -> usize { 50_000 }

impl AppConfig {
    /// Base URL override for a provider: `<ID>_API_URL` env first, then the config file.
    pub fn provider_url(&self, provider: &str) -> Option<String> {
        let env_name = format!("{}_API_URL", provider.to_uppercase());
        env::var(&env_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| self.providers.get(provider).and_then(|p| p.base_url.clone()))
    }

    /// Strategy toggle at process start; `USE_MULTI_API=true` wins over the file.
    pub fn initial_runtime_config(&self) -> RuntimeConfig {
        let use_multi_api = match env::var("USE_MULTI_API") {
            Ok(v) => v.trim() == "true",
            Err(_) => self.detection.use_multi_api,
        };
        RuntimeConfig { use_multi_api }
    }
}

/// Shared, guarded runtime strategy cell. Reads and writes are atomic per access.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfigHandle {
    inner: Arc<RwLock<RuntimeConfig>>,
}

impl RuntimeConfigHandle {
    pub fn new(initial: RuntimeConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub async fn get(&self) -> RuntimeConfig {
        *self.inner.read().await
    }

    pub async fn set_use_multi_api(&self, use_multi_api: bool) -> RuntimeConfig {
        let mut guard = self.inner.write().await;
        guard.use_multi_api = use_multi_api;
        *guard
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// `CONTENTGUARD_CONFIG_DIR`, else the platform config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        match env::var("CONTENTGUARD_CONFIG_DIR") {
            Ok(p) if !p.trim().is_empty() => Some(PathBuf::from(p)),
            _ => dirs::config_dir().map(|p| p.join("contentguard")),
        }
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn ensure_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir).map_err(io_err(&self.config_dir))
    }

    /// Load configuration; a missing file yields defaults.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file).map_err(io_err(&self.config_file))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_file, content).map_err(io_err(&self.config_file))
    }

    fn create_backup(&self) -> Result<(), ConfigError> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir).map_err(io_err(&backup_dir))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%.3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file).map_err(io_err(&backup_file))?;

        self.cleanup_old_backups(&backup_dir, MAX_BACKUPS)
    }

    /// Remove old backups, keeping only the most recent `keep`
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), ConfigError> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(io_err(backup_dir))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first; names embed the timestamp
        entries.sort_by_key(|e| e.file_name());

        let remove_count = entries.len() - keep;
        for entry in entries.iter().take(remove_count) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    pub fn set_api_key(&self, provider: &str, key: &str) -> Result<(), ConfigError> {
        let mut config = self.load()?;
        config.api_keys.insert(provider.to_string(), key.to_string());
        self.save(&config)
    }

    pub fn delete_api_key(&self, provider: &str) -> Result<bool, ConfigError> {
        let mut config = self.load()?;
        let removed = config.api_keys.remove(provider).is_some();
        if removed {
            self.save(&config)?;
        }
        Ok(removed)
    }
}
