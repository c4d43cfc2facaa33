//! Login, profile and password endpoints.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use shapeshift_core::User;
use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::normalize::parse_record;

/// Where different API versions put the token, in lookup order.
const TOKEN_PATHS: [&[&str]; 6] = [
    &["token"],
    &["data", "token"],
    &["accessToken"],
    &["data", "accessToken"],
    &["authToken"],
    &["data", "authToken"],
];

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginResponse {
    pub token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub user: Option<User>,
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

fn non_empty_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Find the token wherever the server put it.
fn extract_token(response: &Value) -> Option<SecretString> {
    TOKEN_PATHS
        .iter()
        .find_map(|path| non_empty_str(response, path))
        .map(SecretString::from)
}

/// `user` or `data.user`.
fn extract_user(response: &Value) -> Option<User> {
    lookup(response, &["user"])
        .or_else(|| lookup(response, &["data", "user"]))
        .cloned()
        .and_then(parse_record)
}

impl ApiClient {
    /// Log in and store the returned token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] if the response carries no token,
    /// or an error if the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let url = self.url(&["auth", "login"])?;
        let body = json!({"email": email, "password": password.expose_secret()});
        let response = Self::send(self.request(Method::POST, url, false).json(&body)).await?;

        let token = extract_token(&response).ok_or(ApiError::MissingToken)?;
        self.set_token(Some(&token));
        tracing::info!("Logged in");

        let refresh_token = non_empty_str(&response, &["refreshToken"])
            .or_else(|| non_empty_str(&response, &["data", "refreshToken"]))
            .map(SecretString::from);

        Ok(LoginResponse {
            token,
            refresh_token,
            user: extract_user(&response),
        })
    }

    /// Fetch the logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] without a network call when no
    /// token is stored, [`ApiError::NotFound`] when the response has no
    /// user, or an error if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ApiError> {
        if self.token().is_none() {
            return Err(ApiError::MissingToken);
        }
        let url = self.url(&["auth", "profile"])?;
        let response = Self::send(self.request(Method::GET, url, true)).await?;
        extract_user(&response).ok_or_else(|| ApiError::NotFound("user profile".to_owned()))
    }

    /// Change the logged-in user's password. Returns the server's message.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] when no token is stored, or an
    /// error if the request fails.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<String, ApiError> {
        if self.token().is_none() {
            return Err(ApiError::MissingToken);
        }
        let url = self.url(&["auth", "change-password"])?;
        let body = json!({
            "currentPassword": current.expose_secret(),
            "newPassword": new.expose_secret(),
        });
        let response = Self::send(self.request(Method::PUT, url, true).json(&body)).await?;
        Ok(non_empty_str(&response, &["message"])
            .unwrap_or("Password changed")
            .to_owned())
    }

    /// Forget the stored token. There is no server-side session to end.
    pub fn logout(&self) {
        self.set_token(None);
        tracing::info!("Logged out");
    }
}
