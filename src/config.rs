use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "filedrop.yaml";

/// Login accepted by `POST /home`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Process configuration, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Directory holding templates and static assets
    #[serde(default = "default_web_root")]
    pub web_root: PathBuf,
    /// Directory receiving uploads; `<web_root>/files` when unset
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
    /// Quota ceiling for the upload directory
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    pub credentials: Credentials,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_web_root() -> PathBuf {
    PathBuf::from("www")
}

fn default_max_files() -> usize {
    10
}

fn default_max_connections() -> usize {
    256
}

impl Config {
    /// Reads and parses a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(raw)?;
        if cfg.max_connections == 0 {
            anyhow::bail!("max_connections must be at least 1");
        }
        Ok(cfg)
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| self.web_root.join("files"))
    }

    /// Replaces the port of `listen_addr`, keeping its host.
    pub fn override_port(&mut self, port: &str) -> anyhow::Result<()> {
        let port: u16 = port
            .parse()
            .with_context(|| format!("Invalid port number: {port}"))?;
        let host = self
            .listen_addr
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(self.listen_addr.as_str());
        self.listen_addr = format!("{host}:{port}");
        Ok(())
    }
}
