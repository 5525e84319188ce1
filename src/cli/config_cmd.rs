//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, AudioConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;
use crate::domain::visualizer::VisualizerMode;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;
    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

/// Validate `value` for `key` and write it into `config`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };
    let flag = || parse_bool(value).map_err(|_| invalid("Value must be 'true' or 'false'".into()));

    match key {
        "api_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid("URL must start with http:// or https://".into()));
            }
            config.api_url = Some(value.to_string());
        }
        "upload_path" => config.upload_path = Some(value.to_string()),
        "convert_to_wav" => config.convert_to_wav = Some(flag()?),
        "timeslice" | "max_duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
            if key == "timeslice" {
                config.timeslice = Some(value.to_string());
            } else {
                config.max_duration = Some(value.to_string());
            }
        }
        "visualizer" => {
            let mode: VisualizerMode = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            config.visualizer = Some(mode.to_string());
        }
        "audio.echo_cancellation" | "audio.noise_suppression" | "audio.auto_gain_control" => {
            let enabled = flag()?;
            let audio = config.audio.get_or_insert_with(AudioConfig::default);
            match key {
                "audio.echo_cancellation" => audio.echo_cancellation = Some(enabled),
                "audio.noise_suppression" => audio.noise_suppression = Some(enabled),
                _ => audio.auto_gain_control = Some(enabled),
            }
        }
        _ => return Err(invalid("Unknown key".into())),
    }
    Ok(())
}

/// Current value of `key` as text
fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    let audio = config.audio.as_ref();
    match key {
        "api_url" => config.api_url.clone(),
        "upload_path" => config.upload_path.clone(),
        "convert_to_wav" => config.convert_to_wav.map(|b| b.to_string()),
        "timeslice" => config.timeslice.clone(),
        "visualizer" => config.visualizer.clone(),
        "max_duration" => config.max_duration.clone(),
        "audio.echo_cancellation" => audio.and_then(|a| a.echo_cancellation).map(|b| b.to_string()),
        "audio.noise_suppression" => audio.and_then(|a| a.noise_suppression).map(|b| b.to_string()),
        "audio.auto_gain_control" => audio.and_then(|a| a.auto_gain_control).map(|b| b.to_string()),
        _ => None,
    }
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;
    presenter.output(read_value(&config, key).as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, read_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("NO"), Ok(false));
        assert_eq!(parse_bool("1"), Ok(true));
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn set_durations() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "timeslice", "500ms").unwrap();
        apply_value(&mut config, "max_duration", "2m").unwrap();
        assert_eq!(config.timeslice.as_deref(), Some("500ms"));
        assert_eq!(config.max_duration_or_default().as_secs(), 120);
        assert!(apply_value(&mut config, "timeslice", "soon").is_err());
    }

    #[test]
    fn set_visualizer_normalizes() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "visualizer", "spectrum").unwrap();
        assert_eq!(read_value(&config, "visualizer").as_deref(), Some("spectrum"));
        assert!(apply_value(&mut config, "visualizer", "sparkles").is_err());
    }

    #[test]
    fn set_audio_flags_creates_section() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "audio.noise_suppression", "false").unwrap();
        assert_eq!(
            read_value(&config, "audio.noise_suppression").as_deref(),
            Some("false")
        );
        assert!(read_value(&config, "audio.echo_cancellation").is_none());
    }

    #[test]
    fn api_url_requires_scheme() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "api_url", "localhost:8000").is_err());
        apply_value(&mut config, "api_url", "https://rec.example.com").unwrap();
        assert_eq!(config.api_url_or_default(), "https://rec.example.com");
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(
            check_key("api_key"),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
