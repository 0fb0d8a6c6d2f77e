use anyhow::{bail, Result};
use contentguard_lib::services::detection::DetectorKind;

const USAGE: &str = "Usage:
  contentguard                          run the HTTP server
  contentguard set-key <provider> <key> store an API key in the config file
  contentguard delete-key <provider>    remove a stored API key

Providers: zerogpt, gptzero, sapling, openai, copyleaks, copyleaks_email";

/// Canonical config key for a provider name, or an error for unknown names.
fn provider_key(name: &str) -> Result<String> {
    if let Some(kind) = DetectorKind::from_name(name) {
        return Ok(kind.id().to_string());
    }
    let lower = name.trim().to_lowercase();
    match lower.as_str() {
        "openai" | "copyleaks" | "copyleaks_email" => Ok(lower),
        _ => bail!("unknown provider: {}", name),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("serve") => contentguard_lib::run().await,
        Some("set-key") => {
            let (Some(provider), Some(key)) = (args.get(1), args.get(2)) else {
                bail!("{}", USAGE);
            };
            let provider = provider_key(provider)?;
            let store = contentguard_lib::open_config_store()?;
            store.set_api_key(&provider, key.trim())?;
            println!("Stored key for {} in {}", provider, store.config_file().display());
            Ok(())
        }
        Some("delete-key") => {
            let Some(provider) = args.get(1) else {
                bail!("{}", USAGE);
            };
            let provider = provider_key(provider)?;
            let store = contentguard_lib::open_config_store()?;
            if store.delete_api_key(&provider)? {
                println!("Removed key for {}", provider);
            } else {
                println!("No stored key for {}", provider);
            }
            Ok(())
        }
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => bail!("unknown command: {}\n\n{}", other, USAGE),
    }
}
