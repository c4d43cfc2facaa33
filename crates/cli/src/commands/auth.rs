//! Login commands.
//!
//! # Usage
//!
//! ```bash
//! SHAPESHIFT_PASSWORD=... shapeshift-cli login -e admin@example.com
//! shapeshift-cli whoami
//! shapeshift-cli logout
//! ```

use secrecy::SecretString;
use shapeshift_storefront::services::{AuthSession, SessionState};
use tracing::info;

use super::{CliError, client};
use crate::output;

/// Log in and store the token.
///
/// # Errors
///
/// Returns an error if the credentials are rejected or the API is unreachable.
pub async fn login(email: &str, password: SecretString) -> Result<(), CliError> {
    let session = AuthSession::new(client()?);
    let response = session.login(email, &password).await?;

    match response.user {
        Some(user) => info!(email = %user.email, role = ?user.role, "Logged in"),
        None => info!(email, "Logged in"),
    }
    Ok(())
}

/// Forget the stored token.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub fn logout() -> Result<(), CliError> {
    AuthSession::new(client()?).logout();
    Ok(())
}

/// Show who the stored token belongs to.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub async fn whoami() -> Result<(), CliError> {
    let session = AuthSession::new(client()?);
    match session.revalidate().await {
        SessionState::Authenticated(user) => output::json(&user)?,
        SessionState::LoggedOut => output::line("Not logged in"),
        SessionState::Offline => {
            output::line("Catalog API unreachable; stored token kept");
        }
    }
    Ok(())
}

/// Change the logged-in user's password.
///
/// # Errors
///
/// Returns an error if not logged in or the server rejects the change.
pub async fn change_password(current: SecretString, new: SecretString) -> Result<(), CliError> {
    let message = client()?.change_password(&current, &new).await?;
    output::line(&message);
    Ok(())
}
