//! Login, logout and whoami handlers

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::application::AuthService;
use crate::infrastructure::ApiClient;

use super::presenter::Presenter;

type StdinLines = Lines<BufReader<Stdin>>;

/// Next stdin line without the line ending; end of input reads as empty
async fn read_line(lines: &mut StdinLines) -> Result<String, String> {
    lines
        .next_line()
        .await
        .map(Option::unwrap_or_default)
        .map_err(|e| format!("Failed to read input: {}", e))
}

/// Log in and store the session cookie
pub async fn handle_login(
    auth: &AuthService<ApiClient>,
    presenter: &Presenter,
    username: Option<String>,
    password_stdin: bool,
) -> Result<(), String> {
    // one reader for both lines so piped input is not lost between reads
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let username = match username {
        Some(username) => username,
        None => {
            presenter.prompt("Username: ");
            read_line(&mut lines).await?
        }
    };
    if !password_stdin {
        presenter.prompt("Password: ");
    }
    let password = read_line(&mut lines).await?;

    let user = auth
        .login(&username, &password)
        .await
        .map_err(|e| e.to_string())?;
    presenter.success(&format!("Logged in as {}", user.display_name()));
    if user.is_admin {
        presenter.info("Admin console available: voicedrop admin --help");
    }
    Ok(())
}

/// End the session; the local session is forgotten even if the server call fails
pub async fn handle_logout(auth: &AuthService<ApiClient>, presenter: &Presenter) {
    match auth.logout().await {
        Ok(()) => presenter.success("Logged out"),
        Err(e) => presenter.warn(&format!("Logged out locally ({})", e)),
    }
}

/// Show the user bound to the stored session
pub async fn handle_whoami(
    auth: &AuthService<ApiClient>,
    presenter: &Presenter,
) -> Result<(), String> {
    let user = auth.require_user().await.map_err(|e| e.to_string())?;
    presenter.user(&user);
    Ok(())
}
