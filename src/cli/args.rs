//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::visualizer::VisualizerMode;

/// Voicedrop - push-to-talk voice recorder with upload
#[derive(Parser, Debug)]
#[command(name = "voicedrop")]
#[command(version)]
#[command(about = "Record voice notes from the microphone and upload them to your recording service")]
#[command(long_about = None)]
pub struct Cli {
    /// API base URL (overrides config file)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login {
        /// Username (prompted when omitted)
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Record from the microphone and upload
    Record(RecordArgs),
    /// List uploaded recordings
    List,
    /// Convert an audio file to 16-bit PCM WAV
    Convert {
        /// Source file (wav, flac, ogg, mp3)
        input: PathBuf,
        /// Destination WAV file
        output: PathBuf,
    },
    /// Manage users and sessions (admins only)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for the record command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RecordArgs {
    /// Record a single take, then exit
    #[arg(long)]
    pub once: bool,

    /// Live visualizer style
    #[arg(long, value_name = "MODE")]
    pub visualizer: Option<VisualizerArg>,

    /// Chunk interval (e.g. 250ms, 1s)
    #[arg(long, value_name = "TIME")]
    pub timeslice: Option<String>,

    /// Stop automatically after this long (e.g. 30s, 5m)
    #[arg(long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Upload the recorder's native format instead of converting to WAV
    #[arg(long)]
    pub no_convert: bool,
}

/// Visualizer argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum VisualizerArg {
    Waveform,
    Spectrum,
    Off,
}

impl From<VisualizerArg> for VisualizerMode {
    fn from(arg: VisualizerArg) -> Self {
        match arg {
            VisualizerArg::Waveform => VisualizerMode::Waveform,
            VisualizerArg::Spectrum => VisualizerMode::Spectrum,
            VisualizerArg::Off => VisualizerMode::Off,
        }
    }
}

/// Admin action subcommands
#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// List all users
    Users,
    /// Create a user
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Initial password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        /// Grant admin rights
        #[arg(long)]
        admin: bool,
    },
    /// Activate or deactivate a user
    ToggleUser {
        /// User id
        id: i64,
    },
    /// Delete a user
    DeleteUser {
        /// User id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List valid sessions
    Sessions,
    /// Revoke a session
    RevokeSession {
        /// Session id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_url",
    "upload_path",
    "convert_to_wav",
    "timeslice",
    "visualizer",
    "max_duration",
    "audio.echo_cancellation",
    "audio.noise_suppression",
    "audio.auto_gain_control",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
