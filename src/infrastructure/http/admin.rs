//! Admin user and session management adapter

use async_trait::async_trait;

use super::client::ApiClient;
use crate::application::ports::{AdminApi, ApiError};
use crate::domain::account::{NewUser, SessionRecord, User, UserUpdate};

#[async_trait]
impl AdminApi for ApiClient {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.send_json(self.get("/api/admin/users")).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.send_json(self.post("/api/admin/users").json(user))
            .await
    }

    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        self.send_json(self.put(&format!("/api/admin/users/{}", id)).json(update))
            .await
    }

    async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.delete(&format!("/api/admin/users/{}", id)))
            .await?;
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionRecord>, ApiError> {
        self.send_json(self.get("/api/admin/sessions")).await
    }

    async fn revoke_session(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.delete(&format!("/api/admin/sessions/{}", id)))
            .await?;
        Ok(())
    }
}
