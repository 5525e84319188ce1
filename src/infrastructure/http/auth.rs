//! Auth service adapter

use async_trait::async_trait;
use serde::Deserialize;

use super::client::ApiClient;
use crate::application::ports::{ApiError, AuthApi};
use crate::domain::account::{Credentials, User};

/// `/me` and `/login` answer either with the user or with `{user: ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserResponse {
    Bare(User),
    Wrapped { user: Option<User> },
}

impl UserResponse {
    fn into_user(self) -> Option<User> {
        match self {
            Self::Wrapped { user } => user,
            Self::Bare(user) => Some(user),
        }
    }
}

fn not_logged_in() -> ApiError {
    ApiError::Status {
        status: 401,
        message: "Not logged in".into(),
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let response: UserResponse = self
            .send_json(self.post("/api/auth/login").json(credentials))
            .await?;
        let user = response
            .into_user()
            .ok_or_else(|| ApiError::Parse("login response carried no user".into()))?;
        self.persist_session();
        Ok(user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.send(self.post("/api/auth/logout")).await?;
        Ok(())
    }

    async fn me(&self) -> Result<User, ApiError> {
        let response: Option<UserResponse> = self.send_json(self.get("/api/auth/me")).await?;
        response
            .and_then(UserResponse::into_user)
            .ok_or_else(not_logged_in)
    }

    async fn verify(&self) -> Result<bool, ApiError> {
        match self.send(self.get("/api/auth/verify")).await {
            Ok(_) => Ok(true),
            Err(ApiError::Status { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn clear_session(&self) {
        self.forget_session();
    }
}
