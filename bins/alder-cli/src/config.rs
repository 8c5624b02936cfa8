//! CLI settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file (`~/.alder/config.toml` unless `--config` is given), then `ALDER_*`
//! environment variables such as `ALDER_NETWORK=testnet` or
//! `ALDER_NODE_HOST=http://127.0.0.1:22973`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use alder_core::constants::Network;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Resolved CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Network preset.
    pub network: Network,
    /// Node REST endpoint; the preset's when unset.
    pub node_host: Option<String>,
    /// Explorer API endpoint; the preset's when unset.
    pub explorer_api_host: Option<String>,
    /// Name of the node wallet holding the keys.
    pub wallet_name: String,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            node_host: None,
            explorer_api_host: None,
            wallet_name: "default".to_string(),
            log_level: "info".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// `~/.alder/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".alder").join("config.toml"))
    }

    /// Load all layers. A missing default file is not an error; a missing
    /// explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::build(path, Some(Environment::with_prefix("ALDER").try_parsing(true)))
    }

    fn build(path: Option<&Path>, env: Option<Environment>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("network", defaults.network.name())?
            .set_default("wallet_name", defaults.wallet_name)?
            .set_default("log_level", defaults.log_level)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?;

        match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("config file not found: {}", path.display());
                }
                builder = builder.add_source(File::from(path));
            }
            None => {
                if let Some(default) = Self::default_path() {
                    builder = builder.add_source(File::from(default).required(false));
                }
            }
        }
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Node REST endpoint, without trailing slash.
    pub fn node_host(&self) -> Result<String> {
        resolve(self.node_host.as_deref(), self.network.default_node_host(), "node_host", self.network)
    }

    /// Explorer API endpoint, without trailing slash.
    pub fn explorer_api_host(&self) -> Result<String> {
        resolve(
            self.explorer_api_host.as_deref(),
            self.network.default_explorer_api_host(),
            "explorer_api_host",
            self.network,
        )
    }

    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn resolve(
    explicit: Option<&str>,
    preset: Option<&'static str>,
    key: &str,
    network: Network,
) -> Result<String> {
    let host = explicit
        .filter(|h| !h.trim().is_empty())
        .or(preset)
        .with_context(|| format!("{key} must be set for the {network} network"))?;
    Ok(host.trim().trim_end_matches('/').to_string())
}
