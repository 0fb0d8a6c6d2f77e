// Originality Service
// CopyLeaks submission with a local heuristic fallback

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::models::{HighlightedPhrase, OriginalityResult};
use super::config_store::AppConfig;
use super::providers::{get_api_key, get_credential, ProviderClient, ProviderError};
use super::text_processor::find_phrase;

const COPYLEAKS_LOGIN_URL: &str = "https://id.copyleaks.com/v3/account/login/api";
const COPYLEAKS_SUBMIT_URL: &str = "https://api.copyleaks.com/v3/education/submit/file";

const PHRASE_SUSPICION: u32 = 20;
const PATTERN_SUSPICION: u32 = 30;
const PLAGIARISM_THRESHOLD: u32 = 70;

const COMMON_PHRASES: &[&str] = &[
    "lorem ipsum",
    "the quick brown fox",
    "to be or not to be",
    "it was the best of times",
];

fn suspicious_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            // Anchored at the very start of the text, not per line
            r"(?i)^\s*copy\s+and\s+paste",
            r"(?i)source:\s*https?://",
            r"(?i)\[citation\s+needed\]",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("suspicious pattern regex"))
        .collect()
    })
}

/// Raw output of the heuristic scan.
#[derive(Debug, Clone, PartialEq)]
pub struct SuspicionScan {
    /// Unbounded sum of penalties; the score floor is applied later.
    pub suspicion_score: u32,
    pub highlights: Vec<HighlightedPhrase>,
}

/// Placeholder phrases add 20 each, suspicious patterns 30 each.
///
/// Only the first occurrence of each phrase or pattern is highlighted.
pub fn scan_suspicion(content: &str) -> SuspicionScan {
    let mut suspicion_score = 0u32;
    let mut highlights = Vec::new();

    for phrase in COMMON_PHRASES {
        if let Some((start, end)) = find_phrase(content, phrase) {
            suspicion_score += PHRASE_SUSPICION;
            highlights.push(HighlightedPhrase {
                text: phrase.to_string(),
                start_index: start,
                end_index: end,
                reason: "Common placeholder text detected".to_string(),
            });
        }
    }

    for re in suspicious_patterns() {
        if let Some(m) = re.find(content) {
            suspicion_score += PATTERN_SUSPICION;
            highlights.push(HighlightedPhrase {
                text: m.as_str().to_string(),
                start_index: m.start(),
                end_index: m.end(),
                reason: "Suspicious pattern detected".to_string(),
            });
        }
    }

    SuspicionScan {
        suspicion_score,
        highlights,
    }
}

/// Heuristic originality: `max(0, 100 - suspicion)`, plagiarised below 70.
pub fn check_with_fallback(content: &str) -> OriginalityResult {
    let scan = scan_suspicion(content);
    let originality_score = 100u32.saturating_sub(scan.suspicion_score);

    OriginalityResult {
        originality_score,
        is_plagiarized: originality_score < PLAGIARISM_THRESHOLD,
        matched_sources: Vec::new(),
        highlighted_matches: scan.highlights,
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
}

/// CopyLeaks account credentials plus where to send the completion webhook.
#[derive(Debug, Clone)]
pub struct CopyleaksClient {
    email: String,
    api_key: String,
    webhook_base: Option<String>,
    login_url: String,
    submit_url: String,
}

impl CopyleaksClient {
    pub fn new(
        email: impl Into<String>,
        api_key: impl Into<String>,
        login_url: impl Into<String>,
        submit_url: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
            webhook_base: None,
            login_url: login_url.into(),
            submit_url: submit_url.into(),
        }
    }

    pub fn with_webhook_base(mut self, base: Option<String>) -> Self {
        self.webhook_base = base;
        self
    }

    /// Enabled only when both the API key and the account email are present.
    ///
    /// Endpoints can be redirected with `COPYLEAKS_LOGIN_API_URL` / `COPYLEAKS_API_URL`
    /// or the matching `providers` entries.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let api_key = get_api_key("copyleaks", config)?;
        let email = get_credential("COPYLEAKS_EMAIL", "copyleaks_email", config)?;
        let login_url = config
            .provider_url("copyleaks_login")
            .unwrap_or_else(|| COPYLEAKS_LOGIN_URL.to_string());
        let submit_url = config
            .provider_url("copyleaks")
            .unwrap_or_else(|| COPYLEAKS_SUBMIT_URL.to_string());
        Some(
            Self::new(email, api_key, login_url, submit_url)
                .with_webhook_base(config.server.public_url.clone()),
        )
    }

    async fn login(&self, client: &ProviderClient) -> Result<String, ProviderError> {
        let reply = client
            .post_json(
                &self.login_url,
                &[],
                &json!({ "email": self.email, "key": self.api_key }),
            )
            .await?;
        let login: LoginResponse =
            serde_json::from_value(reply.body).map_err(|e| ProviderError::JsonError(e.to_string()))?;
        login.access_token.ok_or(ProviderError::MissingField("access_token"))
    }

    /// Log in and submit the content for scanning.
    ///
    /// Scan results are delivered to the status webhook asynchronously, so the
    /// returned result is the provisional heuristic verdict for the same text.
    pub async fn check(
        &self,
        client: &ProviderClient,
        content: &str,
    ) -> Result<OriginalityResult, ProviderError> {
        let token = self.login(client).await?;
        let scan_id = format!("scan-{}", uuid::Uuid::new_v4());

        let mut properties = json!({});
        if let Some(base) = &self.webhook_base {
            properties["webhooks"] = json!({
                "status": format!("{}/api/copyleaks/webhook/{}", base.trim_end_matches('/'), scan_id)
            });
        }
        let body = json!({
            "base64": BASE64.encode(content.as_bytes()),
            "filename": "content.txt",
            "properties": properties,
        });

        let response = client
            .http()
            .put(format!("{}/{}", self.submit_url.trim_end_matches('/'), scan_id))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        info!(scan_id = %scan_id, "copyleaks.submitted");
        Ok(check_with_fallback(content))
    }
}

/// External check when configured, heuristic otherwise or on any failure.
pub async fn check_originality(
    client: &ProviderClient,
    copyleaks: Option<&CopyleaksClient>,
    content: &str,
) -> OriginalityResult {
    if let Some(copyleaks) = copyleaks {
        match copyleaks.check(client, content).await {
            Ok(result) => return result,
            Err(e) => warn!(error = %e, "CopyLeaks API failed, using fallback"),
        }
    }
    check_with_fallback(content)
}
