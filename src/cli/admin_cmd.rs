//! Admin console command handler

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::{AdminConsole, AuthService};
use crate::domain::account::NewUser;
use crate::infrastructure::ApiClient;

use super::args::AdminAction;
use super::presenter::Presenter;

async fn confirm(presenter: &Presenter, question: &str) -> bool {
    presenter.prompt(&format!("{} [y/N] ", question));
    let mut line = String::new();
    if BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .is_err()
    {
        return false;
    }
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Handle admin subcommand
pub async fn handle_admin_command(
    action: AdminAction,
    auth: &AuthService<ApiClient>,
    presenter: &Presenter,
) -> Result<(), String> {
    let operator = auth.require_admin().await.map_err(|e| e.to_string())?;
    let console =
        AdminConsole::new(auth.api().clone(), operator).map_err(|e| e.to_string())?;

    match action {
        AdminAction::Users => {
            let users = console.users().await.map_err(|e| e.to_string())?;
            presenter.users(&users);
        }
        AdminAction::CreateUser {
            username,
            email,
            password,
            full_name,
            admin,
        } => {
            let password = match password {
                Some(password) => password,
                None => {
                    presenter.prompt("Password for new user: ");
                    let mut line = String::new();
                    BufReader::new(tokio::io::stdin())
                        .read_line(&mut line)
                        .await
                        .map_err(|e| format!("Failed to read password: {}", e))?;
                    line.trim_end_matches(['\r', '\n']).to_string()
                }
            };
            let created = console
                .create_user(NewUser {
                    username,
                    email,
                    password,
                    full_name,
                    is_admin: admin,
                })
                .await
                .map_err(|e| e.to_string())?;
            presenter.success(&format!("Created user {} (id {})", created.username, created.id));
        }
        AdminAction::ToggleUser { id } => {
            let user = console
                .toggle_user_active(id)
                .await
                .map_err(|e| e.to_string())?;
            presenter.success(&format!("{} is now {}", user.username, user.status()));
        }
        AdminAction::DeleteUser { id, yes } => {
            if !yes && !confirm(presenter, &format!("Delete user {}?", id)).await {
                presenter.info("Cancelled");
                return Ok(());
            }
            console.delete_user(id).await.map_err(|e| e.to_string())?;
            presenter.success(&format!("Deleted user {}", id));
        }
        AdminAction::Sessions => {
            let sessions = console.valid_sessions().await.map_err(|e| e.to_string())?;
            presenter.sessions(&sessions);
        }
        AdminAction::RevokeSession { id, yes } => {
            if !yes && !confirm(presenter, &format!("Revoke session {}?", id)).await {
                presenter.info("Cancelled");
                return Ok(());
            }
            console
                .revoke_session(id)
                .await
                .map_err(|e| e.to_string())?;
            presenter.success(&format!("Revoked session {}", id));
        }
    }
    Ok(())
}
