//! Voicedrop CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voicedrop::application::AuthService;
use voicedrop::cli::{
    account_cmd::{handle_login, handle_logout, handle_whoami},
    admin_cmd::handle_admin_command,
    app::{build_client, load_merged_config, run_record, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands, RecordArgs},
    config_cmd::handle_config_command,
    presenter::Presenter,
    recordings_cmd::{handle_convert, handle_list},
};
use voicedrop::domain::config::AppConfig;
use voicedrop::domain::recording::Duration;
use voicedrop::domain::visualizer::VisualizerMode;
use voicedrop::infrastructure::XdgConfigStore;

/// Diagnostics go to stderr; VOICEDROP_LOG wins over RUST_LOG
fn init_tracing() {
    let filter = EnvFilter::try_from_env("VOICEDROP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Command-line overrides layered on top of file and env config
fn cli_overrides(api_url: Option<String>, record: Option<&RecordArgs>) -> AppConfig {
    let mut config = AppConfig {
        api_url,
        ..Default::default()
    };
    if let Some(args) = record {
        config.visualizer = args.visualizer.map(|v| VisualizerMode::from(v).to_string());
        config.timeslice = args.timeslice.clone();
        config.max_duration = args.max_duration.clone();
        if args.no_convert {
            config.convert_to_wav = Some(false);
        }
    }
    config
}

/// Reject malformed durations given on the command line
fn check_durations(args: &RecordArgs) -> Result<(), String> {
    for (name, value) in [
        ("timeslice", &args.timeslice),
        ("max-duration", &args.max_duration),
    ] {
        if let Some(value) = value {
            value
                .parse::<Duration>()
                .map_err(|e| format!("Invalid {}: {}", name, e))?;
        }
    }
    Ok(())
}

fn finish(presenter: &Presenter, result: Result<(), String>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            presenter.error(&e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Config and convert never touch the server
    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            let result = handle_config_command(action, &store, &presenter)
                .await
                .map_err(|e| e.to_string());
            return finish(&presenter, result);
        }
        Commands::Convert { input, output } => {
            let result = handle_convert(&input, &output, &presenter).await;
            return finish(&presenter, result);
        }
        _ => {}
    }

    let record_args = match &cli.command {
        Commands::Record(args) => Some(args),
        _ => None,
    };
    if let Some(args) = record_args {
        if let Err(e) = check_durations(args) {
            presenter.error(&e);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    }

    let config = load_merged_config(cli_overrides(cli.api_url.clone(), record_args)).await;
    tracing::debug!(api_url = %config.api_url_or_default(), "configuration loaded");

    if let Commands::Record(args) = cli.command {
        return run_record(args, config).await;
    }

    let client = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };
    let auth = AuthService::new(client.clone());

    let result = match cli.command {
        Commands::Login {
            username,
            password_stdin,
        } => handle_login(&auth, &presenter, username, password_stdin).await,
        Commands::Logout => {
            handle_logout(&auth, &presenter).await;
            Ok(())
        }
        Commands::Whoami => handle_whoami(&auth, &presenter).await,
        Commands::List => match auth.require_user().await {
            Ok(_) => handle_list(&client, &presenter).await,
            Err(e) => Err(e.to_string()),
        },
        Commands::Admin { action } => handle_admin_command(action, &auth, &presenter).await,
        Commands::Record(_) | Commands::Config { .. } | Commands::Convert { .. } => Ok(()),
    };
    finish(&presenter, result)
}
