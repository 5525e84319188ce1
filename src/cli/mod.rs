//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! and the command runners.

pub mod account_cmd;
pub mod admin_cmd;
pub mod app;
pub mod args;
pub mod config_cmd;
pub mod presenter;
pub mod recordings_cmd;
pub mod signals;

// Re-export commonly used types
pub use app::{run_record, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{AdminAction, Cli, Commands, ConfigAction, RecordArgs};
pub use presenter::Presenter;
