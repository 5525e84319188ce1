//! Configuration domain module

mod app_config;

pub use app_config::{AppConfig, AudioConfig, DEFAULT_API_URL, DEFAULT_UPLOAD_PATH};
