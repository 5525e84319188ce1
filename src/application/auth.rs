//! Authentication use case

use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::domain::account::{Credentials, MissingCredentials, User};

use super::ports::{ApiError, AuthApi};

/// Errors from the auth use case
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error(transparent)]
    MissingCredentials(#[from] MissingCredentials),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Not logged in. Run 'voicedrop login' first.")]
    NotLoggedIn,

    #[error("Admin access required")]
    NotAdmin,
}

/// Login state with a cached current user
pub struct AuthService<A>
where
    A: AuthApi,
{
    api: A,
    cached: Mutex<Option<User>>,
}

impl<A> AuthService<A>
where
    A: AuthApi,
{
    /// Create a new service with nothing cached
    pub fn new(api: A) -> Self {
        Self {
            api,
            cached: Mutex::new(None),
        }
    }

    /// Access the underlying API adapter
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Log in; empty fields are rejected before any request is sent
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let credentials = Credentials::new(username, password)?;
        let user = self.api.login(&credentials).await?;
        tracing::info!(username = %user.username, "logged in");
        self.store(Some(user.clone()));
        Ok(user)
    }

    /// Log out. Local state is cleared even when the server call fails;
    /// that failure is still returned so it can be shown.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.api.logout().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "logout request failed, clearing local session anyway");
        }
        self.store(None);
        self.api.clear_session().await;
        result
    }

    /// Cached user, or the one the server reports for this session.
    ///
    /// A rejected session yields `Ok(None)`; transport failures are errors.
    pub async fn current_user(&self) -> Result<Option<User>, ApiError> {
        if let Some(user) = self.cached() {
            return Ok(Some(user));
        }
        match self.api.me().await {
            Ok(user) => {
                self.store(Some(user.clone()));
                Ok(Some(user))
            }
            Err(ApiError::Status { status, .. }) => {
                tracing::debug!(status, "no active session");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Ask the server whether the session is still valid
    pub async fn verify(&self) -> bool {
        self.api.verify().await.unwrap_or(false)
    }

    pub fn is_logged_in(&self) -> bool {
        self.cached().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.cached().is_some_and(|user| user.is_admin)
    }

    /// The current user, who must be logged in
    pub async fn require_user(&self) -> Result<User, AuthError> {
        self.current_user().await?.ok_or(AuthError::NotLoggedIn)
    }

    /// The current user, who must be an admin
    pub async fn require_admin(&self) -> Result<User, AuthError> {
        let user = self.require_user().await?;
        if !user.is_admin {
            return Err(AuthError::NotAdmin);
        }
        Ok(user)
    }

    fn cached(&self) -> Option<User> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, user: Option<User>) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = user;
    }
}
