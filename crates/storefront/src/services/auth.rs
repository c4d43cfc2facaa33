//! Login session.

use secrecy::SecretString;
use shapeshift_core::User;
use tracing::instrument;

use crate::api::{ApiClient, ApiError, LoginResponse};

/// Outcome of checking the stored token against the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The token is valid.
    Authenticated(User),
    /// No token, or the server rejected it.
    LoggedOut,
    /// The server could not be asked. The token is kept.
    Offline,
}

impl SessionState {
    /// The user, when authenticated.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::LoggedOut | Self::Offline => None,
        }
    }
}

/// Authentication against the catalog API.
#[derive(Debug, Clone)]
pub struct AuthSession {
    api: ApiClient,
}

impl AuthSession {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Whether a token is stored. Says nothing about its validity.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.api.token().is_some()
    }

    /// Log in and store the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        self.api.login(email, password).await
    }

    pub fn logout(&self) {
        self.api.logout();
    }

    /// Check the stored token.
    ///
    /// Only a 401 or 403 clears the token. Network failures and other
    /// server errors leave it in place and report [`SessionState::Offline`].
    #[instrument(skip(self))]
    pub async fn revalidate(&self) -> SessionState {
        if !self.has_token() {
            return SessionState::LoggedOut;
        }

        match self.api.profile().await {
            Ok(user) => SessionState::Authenticated(user),
            Err(e) if e.is_auth_failure() => {
                tracing::info!(error = %e, "Stored token rejected, logging out");
                self.api.logout();
                SessionState::LoggedOut
            }
            Err(ApiError::MissingToken) => SessionState::LoggedOut,
            Err(e) => {
                tracing::warn!(error = %e, "Could not revalidate session, keeping token");
                SessionState::Offline
            }
        }
    }
}
