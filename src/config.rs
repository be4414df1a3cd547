//! Server configuration.
//!
//! Loaded from a YAML file (path in `LANTERN_CONFIG`, default `lantern.yaml`).
//! A missing default file means built-in defaults. The `LISTEN` environment
//! variable overrides `server.listen_addr`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "LANTERN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "lantern.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    pub app: AppConfig,
    pub redirects: Vec<RedirectConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Seconds a connection may sit idle waiting for bytes
    pub idle_timeout_secs: u64,
    /// Requests served on one keep-alive connection before it is closed
    pub keep_alive_max: usize,
    pub max_header_bytes: usize,
    /// Requests declaring a larger body are rejected with 400
    pub max_body_bytes: usize,
    /// Concurrent connections; further accepts wait for a free slot
    pub max_connections: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// JSON file with `{"credentials": [{"username": .., "password": ..}]}`
    pub users_file: PathBuf,
    pub upload_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedirectConfig {
    pub from: String,
    pub to: String,
    #[serde(default = "default_redirect_status")]
    pub status: u16,
}

fn default_redirect_status() -> u16 {
    301
}

impl Default for Config {
    fn default() -> Self {
        let moved = |from: &str| RedirectConfig {
            from: from.to_string(),
            to: "/new-page.html".to_string(),
            status: 301,
        };

        Self {
            server: ServerConfig::default(),
            static_files: StaticFilesConfig::default(),
            app: AppConfig::default(),
            redirects: vec![moved("/old-page"), moved("/redirect-test")],
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            idle_timeout_secs: 60,
            keep_alive_max: 100,
            max_header_bytes: crate::http::parser::DEFAULT_MAX_HEADER_BYTES,
            max_body_bytes: 10 * 1024 * 1024,
            max_connections: 1024,
        }
    }
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("web"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            users_file: PathBuf::from("users.json"),
            upload_dir: PathBuf::from("web/uploads"),
        }
    }
}

impl Config {
    /// Loads the config file, applies environment overrides and validates.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(text).context("invalid YAML config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(listen) = std::env::var("LISTEN") {
            self.server.listen_addr = listen;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.idle_timeout_secs == 0 {
            bail!("server.idle_timeout_secs must be greater than zero");
        }
        if self.server.keep_alive_max == 0 {
            bail!("server.keep_alive_max must be greater than zero");
        }
        if self.server.max_connections == 0 {
            bail!("server.max_connections must be greater than zero");
        }
        if self.server.max_header_bytes < 64 {
            bail!("server.max_header_bytes must be at least 64");
        }
        if self.server.max_body_bytes == 0 {
            bail!("server.max_body_bytes must be greater than zero");
        }

        for redirect in &self.redirects {
            if !redirect.from.starts_with('/') {
                bail!("redirect source {:?} must start with '/'", redirect.from);
            }
            if !matches!(redirect.status, 301 | 302) {
                bail!(
                    "redirect {} has status {}, expected 301 or 302",
                    redirect.from,
                    redirect.status
                );
            }
        }

        Ok(())
    }
}
