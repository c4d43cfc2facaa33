//! Login and token revalidation against the mock catalog API.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use shapeshift_integration_tests::{MockCatalogApi, PASSWORD, TOKEN};
use shapeshift_storefront::api::{ApiClient, ApiConfig, ApiError};
use shapeshift_storefront::services::{AuthSession, SessionState};
use shapeshift_storefront::storage::{KeyValueStore, MemoryStore, keys};

fn session(api: &MockCatalogApi) -> (AuthSession, ApiClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let client = ApiClient::new(&ApiConfig::new(api.base_url().clone()), store.clone()).unwrap();
    (AuthSession::new(client.clone()), client, store)
}

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_owned())
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_stores_token_and_user() {
    let api = MockCatalogApi::spawn().await;
    let (auth, _, store) = session(&api);

    let response = auth
        .login("admin@example.com", &password(PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.token.expose_secret(), TOKEN);
    assert_eq!(
        response.refresh_token.unwrap().expose_secret(),
        "mock-refresh"
    );
    assert_eq!(response.user.unwrap().email, "admin@example.com");
    assert_eq!(store.get(keys::AUTH_TOKEN).as_deref(), Some(TOKEN));
    assert!(auth.has_token());
}

#[tokio::test]
async fn test_rejected_login_stores_nothing() {
    let api = MockCatalogApi::spawn().await;
    let (auth, _, store) = session(&api);

    let err = auth
        .login("admin@example.com", &password("wrong"))
        .await
        .unwrap_err();

    assert!(err.is_auth_failure());
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(store.get(keys::AUTH_TOKEN).is_none());
}

#[tokio::test]
async fn test_logout_clears_token() {
    let api = MockCatalogApi::spawn().await;
    let (auth, _, _) = session(&api);
    auth.login("admin@example.com", &password(PASSWORD))
        .await
        .unwrap();

    auth.logout();
    assert!(!auth.has_token());
    assert_eq!(auth.revalidate().await, SessionState::LoggedOut);
}

// =============================================================================
// Revalidation
// =============================================================================

#[tokio::test]
async fn test_revalidate_without_token_skips_request() {
    let api = MockCatalogApi::spawn().await;
    let (auth, _, _) = session(&api);

    assert_eq!(auth.revalidate().await, SessionState::LoggedOut);
    assert_eq!(api.count("GET /api/v1/auth/profile"), 0);
}

#[tokio::test]
async fn test_revalidate_valid_token() {
    let api = MockCatalogApi::spawn().await;
    let (auth, _, _) = session(&api);
    auth.login("admin@example.com", &password(PASSWORD))
        .await
        .unwrap();

    let state = auth.revalidate().await;
    let user = state.user().unwrap();
    assert!(user.is_admin());
    assert_eq!(api.count("GET /api/v1/auth/profile"), 1);
}

#[tokio::test]
async fn test_revalidate_rejected_token_logs_out() {
    let api = MockCatalogApi::spawn().await;
    let (auth, client, _) = session(&api);
    client.set_token(Some(&password("stale-token")));

    assert_eq!(auth.revalidate().await, SessionState::LoggedOut);
    assert!(!auth.has_token());
}

#[tokio::test]
async fn test_revalidate_server_error_keeps_token() {
    let api = MockCatalogApi::spawn().await;
    let (auth, _, store) = session(&api);
    auth.login("admin@example.com", &password(PASSWORD))
        .await
        .unwrap();
    api.with_data(|data| data.profile_status = 500);

    assert_eq!(auth.revalidate().await, SessionState::Offline);
    assert_eq!(store.get(keys::AUTH_TOKEN).as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_revalidate_forbidden_logs_out() {
    let api = MockCatalogApi::spawn().await;
    let (auth, _, _) = session(&api);
    auth.login("admin@example.com", &password(PASSWORD))
        .await
        .unwrap();
    api.with_data(|data| data.profile_status = 403);

    assert_eq!(auth.revalidate().await, SessionState::LoggedOut);
    assert!(!auth.has_token());
}

#[tokio::test]
async fn test_unreachable_server_is_offline() {
    let store = Arc::new(MemoryStore::new());
    // Nothing listens on the discard port.
    let config = ApiConfig::new("http://127.0.0.1:9/api/v1".parse().unwrap());
    let client = ApiClient::new(&config, store).unwrap();
    client.set_token(Some(&password(TOKEN)));
    let auth = AuthSession::new(client);

    assert_eq!(auth.revalidate().await, SessionState::Offline);
    assert!(auth.has_token());
}

#[tokio::test]
async fn test_profile_requires_token() {
    let api = MockCatalogApi::spawn().await;
    let (_, client, _) = session(&api);

    assert!(matches!(client.profile().await, Err(ApiError::MissingToken)));
    assert!(api.requests().is_empty());
}
