//! Settings storage port

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Where user settings are persisted.
///
/// A missing file is not an error: `load` returns an empty config so the
/// caller's defaults and overrides still apply.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Write the whole config, creating parent directories as needed
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    fn path(&self) -> PathBuf;

    fn exists(&self) -> bool;

    /// Write a file holding the defaults; refuses to overwrite
    async fn init(&self) -> Result<(), ConfigError>;
}
