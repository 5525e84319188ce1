//! Admin console use case

use thiserror::Error;

use crate::domain::account::{NewUser, SessionRecord, User, UserUpdate};

use super::ports::{AdminApi, ApiError};

/// Errors from the admin console
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("Admin access required")]
    NotAdmin,

    #[error("User not found")]
    UserNotFound(i64),

    #[error("You cannot modify your own account from the admin console")]
    CannotModifySelf,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Api(#[from] ApiError),
}

/// User and session management, available to admins only
pub struct AdminConsole<A>
where
    A: AdminApi,
{
    api: A,
    operator: User,
}

impl<A> AdminConsole<A>
where
    A: AdminApi,
{
    /// Open the console for `operator`, who must be an admin
    pub fn new(api: A, operator: User) -> Result<Self, AdminError> {
        if !operator.is_admin {
            return Err(AdminError::NotAdmin);
        }
        Ok(Self { api, operator })
    }

    pub fn operator(&self) -> &User {
        &self.operator
    }

    pub async fn users(&self) -> Result<Vec<User>, AdminError> {
        Ok(self.api.list_users().await?)
    }

    /// Create an account after checking the required fields locally
    pub async fn create_user(&self, mut user: NewUser) -> Result<User, AdminError> {
        user.username = user.username.trim().to_string();
        user.email = user.email.trim().to_string();
        user.full_name = user
            .full_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        if user.username.is_empty() {
            return Err(AdminError::InvalidInput("username is required".into()));
        }
        if user.email.is_empty() || !user.email.contains('@') {
            return Err(AdminError::InvalidInput("a valid email is required".into()));
        }
        if user.password.is_empty() {
            return Err(AdminError::InvalidInput("password is required".into()));
        }

        let created = self.api.create_user(&user).await?;
        tracing::info!(id = created.id, username = %created.username, "user created");
        Ok(created)
    }

    /// Flip a user's active flag
    pub async fn toggle_user_active(&self, id: i64) -> Result<User, AdminError> {
        self.guard_self(id)?;
        let users = self.api.list_users().await?;
        let user = users
            .into_iter()
            .find(|u| u.id == id)
            .ok_or(AdminError::UserNotFound(id))?;

        let updated = self
            .api
            .update_user(id, &UserUpdate::active(!user.is_active))
            .await?;
        tracing::info!(id, is_active = updated.is_active, "user status changed");
        Ok(updated)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), AdminError> {
        self.guard_self(id)?;
        self.api.delete_user(id).await?;
        tracing::info!(id, "user deleted");
        Ok(())
    }

    /// Sessions that are still valid
    pub async fn valid_sessions(&self) -> Result<Vec<SessionRecord>, AdminError> {
        let sessions = self.api.list_sessions().await?;
        Ok(sessions.into_iter().filter(|s| s.is_valid).collect())
    }

    pub async fn revoke_session(&self, id: i64) -> Result<(), AdminError> {
        self.api.revoke_session(id).await?;
        tracing::info!(id, "session revoked");
        Ok(())
    }

    fn guard_self(&self, id: i64) -> Result<(), AdminError> {
        if id == self.operator.id {
            return Err(AdminError::CannotModifySelf);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn user(id: i64, username: &str, admin: bool, active: bool) -> User {
        User {
            id,
            username: username.into(),
            email: Some(format!("{}@example.com", username)),
            full_name: None,
            is_active: active,
            is_admin: admin,
            created_at: None,
        }
    }

    fn session(id: i64, valid: bool) -> SessionRecord {
        SessionRecord {
            id,
            user_id: Some(2),
            username: Some("bob".into()),
            created_at: None,
            expires_at: None,
            is_valid: valid,
        }
    }

    struct MockAdmin {
        users: Mutex<Vec<User>>,
        updates: Mutex<Vec<(i64, UserUpdate)>>,
        deleted: Mutex<Vec<i64>>,
        created: Mutex<Vec<NewUser>>,
    }

    impl MockAdmin {
        fn new() -> Self {
            Self {
                users: Mutex::new(vec![
                    user(1, "root", true, true),
                    user(2, "bob", false, true),
                ]),
                updates: Mutex::new(Vec::new()),
                deleted: Mutex::new(Vec::new()),
                created: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AdminApi for MockAdmin {
        async fn list_users(&self) -> Result<Vec<User>, ApiError> {
            Ok(self.users.lock().unwrap().clone())
        }

        async fn create_user(&self, new_user: &NewUser) -> Result<User, ApiError> {
            self.created.lock().unwrap().push(new_user.clone());
            Ok(user(3, &new_user.username, new_user.is_admin, true))
        }

        async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, ApiError> {
            self.updates.lock().unwrap().push((id, update.clone()));
            let mut found = user(id, "bob", false, true);
            if let Some(active) = update.is_active {
                found.is_active = active;
            }
            Ok(found)
        }

        async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
            self.deleted.lock().unwrap().push(id);
            Ok(())
        }

        async fn list_sessions(&self) -> Result<Vec<SessionRecord>, ApiError> {
            Ok(vec![session(10, true), session(11, false), session(12, true)])
        }

        async fn revoke_session(&self, id: i64) -> Result<(), ApiError> {
            if id == 99 {
                return Err(ApiError::Status {
                    status: 404,
                    message: "Session not found".into(),
                });
            }
            Ok(())
        }
    }

    fn console() -> AdminConsole<MockAdmin> {
        AdminConsole::new(MockAdmin::new(), user(1, "root", true, true)).unwrap()
    }

    #[test]
    fn non_admin_cannot_open_console() {
        let result = AdminConsole::new(MockAdmin::new(), user(2, "bob", false, true));
        assert_eq!(result.err(), Some(AdminError::NotAdmin));
    }

    #[tokio::test]
    async fn toggle_flips_active_flag() {
        let console = console();
        let updated = console.toggle_user_active(2).await.unwrap();
        assert!(!updated.is_active);
        let updates = console.api.updates.lock().unwrap();
        assert_eq!(updates[0], (2, UserUpdate::active(false)));
    }

    #[tokio::test]
    async fn toggle_unknown_user() {
        let err = console().toggle_user_active(42).await.unwrap_err();
        assert_eq!(err, AdminError::UserNotFound(42));
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn operator_cannot_touch_own_account() {
        let console = console();
        assert_eq!(
            console.toggle_user_active(1).await.unwrap_err(),
            AdminError::CannotModifySelf
        );
        assert_eq!(
            console.delete_user(1).await.unwrap_err(),
            AdminError::CannotModifySelf
        );
        assert!(console.api.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_valid_sessions_are_listed() {
        let sessions = console().valid_sessions().await.unwrap();
        let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![10, 12]);
    }

    #[tokio::test]
    async fn create_user_validates_and_trims() {
        let console = console();
        let err = console
            .create_user(NewUser {
                username: "  ".into(),
                email: "x@example.com".into(),
                password: "pw".into(),
                full_name: None,
                is_admin: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::InvalidInput(_)));

        let created = console
            .create_user(NewUser {
                username: " carol ".into(),
                email: "carol@example.com".into(),
                password: "pw".into(),
                full_name: Some("   ".into()),
                is_admin: true,
            })
            .await
            .unwrap();
        assert_eq!(created.username, "carol");
        let sent = console.api.created.lock().unwrap();
        assert_eq!(sent[0].full_name, None);
    }

    #[tokio::test]
    async fn revoke_error_is_surfaced() {
        let err = console().revoke_session(99).await.unwrap_err();
        assert_eq!(err.to_string(), "Session not found");
    }
}
