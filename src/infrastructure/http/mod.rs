//! HTTP adapters for the remote recording service

mod admin;
mod auth;
mod client;
mod recordings;
mod session_file;

pub use client::{extract_error_message, ApiClient};
pub use recordings::UPLOAD_FIELD;
pub use session_file::SessionFile;
