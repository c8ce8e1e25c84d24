//! Subcommand implementations

pub mod download;
pub mod market;

use anyhow::{Context, Result};
use poloniex_public::{ClientConfig, PublicClient};
use tracing::info;

/// Build a client from a config file, or from the environment when none is given
pub fn client(config_path: Option<&str>) -> Result<PublicClient> {
    let config = match config_path {
        Some(path) => {
            let config = ClientConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path))?;
            info!("Loaded configuration from: {}", path);
            config
        }
        None => ClientConfig::from_env(),
    };
    info!(
        "Endpoints: legacy {} | markets {}",
        config.legacy_url, config.markets_url
    );
    Ok(PublicClient::with_config(config))
}

/// Pretty-print any serializable value as JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", text);
    Ok(())
}
