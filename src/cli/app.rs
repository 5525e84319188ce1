//! Main app runner for interactive recording

use std::env;
use std::process::ExitCode;
use std::time::Duration as StdDuration;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::ports::{ApiError, ConfigStore, PermissionState};
use crate::application::{
    AuthService, CaptureSettings, CaptureUpdate, SubmitRecordingUseCase, Transcoder,
    VoiceRecorder,
};
use crate::domain::capture::{CaptureState, StartOutcome};
use crate::domain::config::AppConfig;
use crate::domain::error::CaptureError;
use crate::infrastructure::{
    ApiClient, ContainerDecoder, CpalPermissionGate, SessionFile, SystemClock, TextCanvas,
    WavMediaRecorder, XdgConfigStore,
};

use super::args::RecordArgs;
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Width of the live visualizer in characters
const VISUALIZER_COLUMNS: usize = 32;

/// Status line refresh rate
const REFRESH_INTERVAL: StdDuration = StdDuration::from_millis(100);

type CliRecorder = VoiceRecorder<CpalPermissionGate, WavMediaRecorder, SystemClock, TextCanvas>;
type CliSubmit = SubmitRecordingUseCase<ApiClient, ContainerDecoder>;

/// Keys accepted while the record loop runs (each followed by Enter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Start or stop a take
    Toggle,
    /// Pause or resume the running take
    Pause,
    Quit,
}

/// Map an input line onto a key command
pub fn parse_key(line: &str) -> Option<KeyCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "r" => Some(KeyCommand::Toggle),
        "p" => Some(KeyCommand::Pause),
        "q" | "quit" | "exit" => Some(KeyCommand::Quit),
        _ => None,
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    let env_config = AppConfig {
        api_url: env::var("VOICEDROP_API_URL").ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// API client for the configured server, with the stored session restored
pub fn build_client(config: &AppConfig) -> Result<ApiClient, ApiError> {
    Ok(ApiClient::new(&config.api_url_or_default())?
        .with_upload_path(config.upload_path_or_default())
        .with_session_file(SessionFile::new()))
}

/// Capture tunables from the merged config
pub fn capture_settings(config: &AppConfig) -> CaptureSettings {
    CaptureSettings {
        timeslice: config.timeslice_or_default(),
        max_duration: config.max_duration_or_default(),
        constraints: config.constraints_or_default(),
        visualizer: config.visualizer_or_default(),
        ..Default::default()
    }
}

/// Run the interactive recorder
pub async fn run_record(args: RecordArgs, config: AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    let client = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };
    let auth = AuthService::new(client.clone());
    match auth.require_user().await {
        Ok(user) => presenter.info(&format!("Logged in as {}", user.display_name())),
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let settings = capture_settings(&config);
    let mut recorder = VoiceRecorder::new(
        CpalPermissionGate::new(),
        WavMediaRecorder::new(),
        SystemClock,
        TextCanvas::new(VISUALIZER_COLUMNS),
        settings,
    );
    let submit = SubmitRecordingUseCase::new(
        client,
        Transcoder::new(ContainerDecoder::new()),
        config.convert_to_wav_or_default(),
    );

    if recorder.permission_state().await == PermissionState::Denied {
        presenter.warn("Microphone access was denied before; trying again");
    }
    if let Err(e) = recorder.request_permission().await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }
    presenter.info(recorder.status_message());

    let shutdown = ShutdownSignal::new();
    shutdown.setup();

    let code = record_loop(&mut recorder, &submit, &mut presenter, &shutdown, args.once).await;

    recorder.cleanup().await;
    presenter.stop_spinner();
    ExitCode::from(code)
}

async fn record_loop(
    recorder: &mut CliRecorder,
    submit: &CliSubmit,
    presenter: &mut Presenter,
    shutdown: &ShutdownSignal,
    once: bool,
) -> u8 {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    if once {
        if !begin_take(recorder, presenter).await {
            return EXIT_ERROR;
        }
    } else {
        presenter.info("Enter: start/stop   p: pause/resume   q: quit");
    }

    loop {
        tokio::select! {
            _ = shutdown.wait() => {
                if recorder.state().is_active() {
                    presenter.spinner_fail("Recording discarded");
                }
                return EXIT_ERROR;
            }
            line = lines.next_line() => {
                let command = match line {
                    Ok(Some(line)) => parse_key(&line),
                    // stdin closed: finish what is running, then leave
                    Ok(None) | Err(_) => {
                        if recorder.state().is_active() {
                            let saved = finish_take(recorder, submit, presenter).await;
                            return if saved { EXIT_SUCCESS } else { EXIT_ERROR };
                        }
                        return EXIT_SUCCESS;
                    }
                };
                match command {
                    Some(KeyCommand::Toggle) if recorder.state().is_active() => {
                        let saved = finish_take(recorder, submit, presenter).await;
                        if once {
                            return if saved { EXIT_SUCCESS } else { EXIT_ERROR };
                        }
                    }
                    Some(KeyCommand::Toggle) => {
                        begin_take(recorder, presenter).await;
                    }
                    Some(KeyCommand::Pause) => toggle_pause(recorder, presenter),
                    Some(KeyCommand::Quit) => {
                        if recorder.state().is_active() {
                            presenter.spinner_fail("Recording discarded");
                        }
                        return EXIT_SUCCESS;
                    }
                    None => presenter.warn("Unknown key. Enter: start/stop, p: pause/resume, q: quit"),
                }
            }
            update = recorder.pump() => {
                if let CaptureUpdate::Failed(e) = update {
                    presenter.spinner_fail(&e.to_string());
                    if once {
                        return EXIT_ERROR;
                    }
                }
            }
            _ = ticker.tick() => {
                if let Some(e) = recorder.handle_resume().await {
                    if presenter.is_spinning() {
                        presenter.spinner_fail(&e.to_string());
                    } else {
                        presenter.warn(&e.to_string());
                    }
                    if once {
                        return EXIT_ERROR;
                    }
                }
                if recorder.exceeded_max_duration() {
                    presenter.update_spinner("Maximum duration reached");
                    let saved = finish_take(recorder, submit, presenter).await;
                    if once {
                        return if saved { EXIT_SUCCESS } else { EXIT_ERROR };
                    }
                } else if recorder.state().is_active() {
                    refresh_status(recorder, presenter);
                }
            }
        }
    }
}

fn refresh_status(recorder: &CliRecorder, presenter: &Presenter) {
    let canvas = recorder.canvas();
    let visualizer = canvas
        .lock()
        .map(|c| c.render())
        .unwrap_or_default();
    presenter.update_recording(
        recorder.status_message(),
        recorder.elapsed(),
        recorder.settings().max_duration,
        &visualizer,
    );
}

/// Start a take, re-acquiring the microphone if it was lost
async fn begin_take(recorder: &mut CliRecorder, presenter: &mut Presenter) -> bool {
    if !recorder.has_permission() {
        if let Err(e) = recorder.request_permission().await {
            presenter.error(&e.to_string());
            return false;
        }
    }
    match recorder.start().await {
        Ok(StartOutcome::Started) => {
            presenter.start_spinner(recorder.status_message());
            true
        }
        Ok(StartOutcome::AlreadyRecording) => {
            presenter.warn("Already recording");
            true
        }
        Ok(StartOutcome::StreamUnavailable) => {
            presenter.error(&CaptureError::StreamUnavailable.to_string());
            false
        }
        Err(e) => {
            presenter.error(&e.to_string());
            false
        }
    }
}

fn toggle_pause(recorder: &mut CliRecorder, presenter: &Presenter) {
    let result = match recorder.state() {
        CaptureState::Recording => recorder.pause(),
        CaptureState::Paused => recorder.resume(),
        _ => {
            presenter.warn("Not recording");
            return;
        }
    };
    match result {
        Ok(()) => refresh_status(recorder, presenter),
        Err(e) => presenter.warn(&e.to_string()),
    }
}

/// Stop the take and upload it. Returns whether it was saved.
async fn finish_take(
    recorder: &mut CliRecorder,
    submit: &CliSubmit,
    presenter: &mut Presenter,
) -> bool {
    presenter.update_spinner(CaptureState::Stopping.status_message());
    let artifact = match recorder.stop().await {
        Ok(artifact) => artifact,
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            return false;
        }
    };

    presenter.update_spinner(&format!("Uploading {}...", artifact.human_readable_size()));
    match submit.execute(artifact).await {
        Ok(output) => {
            presenter.spinner_success(&format!(
                "Recording saved successfully! {} ({})",
                output.receipt.filename,
                output.artifact.human_readable_size()
            ));
            true
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(parse_key(""), Some(KeyCommand::Toggle));
        assert_eq!(parse_key("  \n"), Some(KeyCommand::Toggle));
        assert_eq!(parse_key("P"), Some(KeyCommand::Pause));
        assert_eq!(parse_key("q"), Some(KeyCommand::Quit));
        assert_eq!(parse_key("x"), None);
    }

    #[test]
    fn settings_follow_config() {
        let config = AppConfig {
            timeslice: Some("1s".into()),
            max_duration: Some("45s".into()),
            visualizer: Some("off".into()),
            ..AppConfig::defaults()
        };
        let settings = capture_settings(&config);
        assert_eq!(settings.timeslice.as_millis(), 1_000);
        assert_eq!(settings.max_duration.as_secs(), 45);
        assert_eq!(settings.visualizer, crate::domain::visualizer::VisualizerMode::Off);
        assert_eq!(settings.stop_timeout.as_secs(), 1);
    }

    #[test]
    fn client_uses_configured_url() {
        let config = AppConfig {
            api_url: Some("http://rec.local:9000/".into()),
            upload_path: Some("upload".into()),
            ..Default::default()
        };
        let client = build_client(&config).unwrap();
        assert_eq!(client.base_url().as_str(), "http://rec.local:9000/");
        assert_eq!(client.upload_path(), "/upload");
    }
}
