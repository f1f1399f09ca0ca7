use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::paths::ConfigPaths;
use crate::webhook::WebhookConfig;

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8787
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// SQLite database file. Defaults to `kv.db` inside the config directory.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(skip)]
    paths: Option<ConfigPaths>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store_path: None,
            webhook: WebhookConfig::default(),
            paths: None,
        }
    }
}

impl ServiceConfig {
    /// Returns the `ConfigPaths` for this config. If paths haven't been set,
    /// creates the default paths (may fail if `$HOME` is unset).
    pub fn paths(&self) -> anyhow::Result<ConfigPaths> {
        match &self.paths {
            Some(p) => Ok(p.clone()),
            None => ConfigPaths::from_home(),
        }
    }

    /// Set a custom `ConfigPaths` (useful for testing or multi-instance).
    pub fn set_paths(&mut self, paths: ConfigPaths) {
        self.paths = Some(paths);
    }

    /// Load config from a specific `ConfigPaths`.
    pub fn load_from(paths: &ConfigPaths) -> anyhow::Result<Self> {
        let config_file = paths.config_path();
        let mut config = if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)?;
            toml::from_str::<ServiceConfig>(&content)?
        } else {
            Self::default()
        };
        config.paths = Some(paths.clone());
        config.validate()?;
        Ok(config)
    }

    /// Validate config values. Called automatically by `load_from`.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must not be 0");
        }
        if self.webhook.tolerance_secs == 0 {
            anyhow::bail!("webhook.tolerance_secs must be greater than 0");
        }
        if matches!(&self.webhook.secret, Some(s) if s.trim().is_empty()) {
            anyhow::bail!("webhook.secret must not be blank when set");
        }
        Ok(())
    }

    /// Resolved database path: the explicit `store_path`, or `kv.db` in the
    /// config directory.
    pub fn resolved_store_path(&self) -> anyhow::Result<PathBuf> {
        match &self.store_path {
            Some(p) => Ok(p.clone()),
            None => Ok(self.paths()?.store_path()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
