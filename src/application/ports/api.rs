//! Remote API port interfaces

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::account::{Credentials, NewUser, SessionRecord, User, UserUpdate};
use crate::domain::recording::{RecordingArtifact, RecordingEntry, UploadReceipt};

/// Remote API errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

impl ApiError {
    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// Port for the authentication service
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Open a session; the session cookie is kept by the adapter
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    /// User bound to the current session
    async fn me(&self) -> Result<User, ApiError>;

    /// Whether the current session is still valid
    async fn verify(&self) -> Result<bool, ApiError>;

    /// Forget the local session cookie
    async fn clear_session(&self);
}

/// Port for uploading and listing recordings
#[async_trait]
pub trait RecordingsApi: Send + Sync {
    async fn upload(&self, artifact: &RecordingArtifact) -> Result<UploadReceipt, ApiError>;

    async fn list(&self) -> Result<Vec<RecordingEntry>, ApiError>;
}

/// Port for the admin user/session management service
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    async fn create_user(&self, user: &NewUser) -> Result<User, ApiError>;

    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, ApiError>;

    async fn delete_user(&self, id: i64) -> Result<(), ApiError>;

    async fn list_sessions(&self) -> Result<Vec<SessionRecord>, ApiError>;

    async fn revoke_session(&self, id: i64) -> Result<(), ApiError>;
}
