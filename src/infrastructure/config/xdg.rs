//! Config file adapter

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// First lines of a freshly initialised file
const INIT_HEADER: &str = "# voicedrop settings. Edit here or use `voicedrop config set <key> <value>`.\n\n";

/// TOML settings file under the user's config directory
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// `<config_dir>/voicedrop/config.toml`, falling back to `~/.config`
    pub fn new() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from(".config"));
        Self::with_path(base.join("voicedrop").join("config.toml"))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Replace the file through a sibling temp file so readers never see half a write
    async fn write_atomic(&self, content: &str) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::WriteError(e.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let staging = self.path.with_extension("toml.tmp");
        fs::write(&staging, content).await.map_err(write_err)?;
        fs::rename(&staging, &self.path).await.map_err(write_err)?;
        tracing::debug!(path = %self.path.display(), "config written");
        Ok(())
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Self::parse_toml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(AppConfig::empty()),
            Err(e) => Err(ConfigError::ReadError(e.to_string())),
        }
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        self.write_atomic(&content).await
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(self.path.display().to_string()));
        }
        let body = toml::to_string_pretty(&AppConfig::defaults())
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        self.write_atomic(&format!("{}{}", INIT_HEADER, body)).await
    }
}
