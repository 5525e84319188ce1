//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::account::{SessionRecord, User};
use crate::domain::recording::{format_file_size, Duration, RecordingEntry};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinner.is_some()
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Prompt on stderr without newline
    pub fn prompt(&self, text: &str) {
        eprint!("{}", text);
        let _ = io::stderr().flush();
    }

    /// Recording status line: state, clock against the limit, visualizer
    pub fn format_recording(
        &self,
        status: &str,
        elapsed: Duration,
        limit: Duration,
        visualizer: &str,
    ) -> String {
        format!(
            "{} {} / {} {}",
            status,
            elapsed.format_clock().bold(),
            limit.format_clock(),
            visualizer
        )
    }

    /// Show the live recording line in the spinner
    pub fn update_recording(&self, status: &str, elapsed: Duration, limit: Duration, visualizer: &str) {
        self.update_spinner(&self.format_recording(status, elapsed, limit, visualizer));
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print the logged-in user
    pub fn user(&self, user: &User) {
        self.key_value("username", &user.username);
        self.key_value("name", user.display_name());
        if let Some(email) = &user.email {
            self.key_value("email", email);
        }
        self.key_value("role", user.role());
    }

    /// Table of uploaded recordings
    pub fn recordings(&self, entries: &[RecordingEntry]) {
        if entries.is_empty() {
            self.info("No recordings yet");
            return;
        }
        for entry in entries {
            println!(
                "{:<40} {:>10}  {}",
                entry.filename,
                format_file_size(entry.size),
                entry.date.as_deref().unwrap_or("-").dimmed()
            );
        }
    }

    /// Table of user accounts
    pub fn users(&self, users: &[User]) {
        for user in users {
            let status = if user.is_active {
                user.status().green()
            } else {
                user.status().red()
            };
            println!(
                "{:>5}  {:<20} {:<30} {:<6} {}",
                user.id,
                user.username,
                user.email.as_deref().unwrap_or("-"),
                user.role(),
                status
            );
        }
    }

    /// Table of login sessions
    pub fn sessions(&self, sessions: &[SessionRecord]) {
        if sessions.is_empty() {
            self.info("No active sessions");
            return;
        }
        for session in sessions {
            println!(
                "{:>5}  {:<20} {:<25} {}",
                session.id,
                session.username.as_deref().unwrap_or("-"),
                session.created_at.as_deref().unwrap_or("-"),
                session.expires_at.as_deref().unwrap_or("-").dimmed()
            );
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_recording_at_start() {
        colored::control::set_override(false);
        let presenter = Presenter::new();
        let line = presenter.format_recording(
            "Recording...",
            Duration::ZERO,
            Duration::from_secs(600),
            "▁▁▁",
        );
        assert_eq!(line, "Recording... 00:00 / 10:00 ▁▁▁");
    }

    #[test]
    fn format_recording_mid_take() {
        colored::control::set_override(false);
        let presenter = Presenter::new();
        let line = presenter.format_recording(
            "Recording paused",
            Duration::from_secs(75),
            Duration::from_secs(90),
            "",
        );
        assert!(line.contains("01:15 / 01:30"));
    }
}
