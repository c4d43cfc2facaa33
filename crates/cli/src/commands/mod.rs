//! Command implementations.
//!
//! Every command talks to the catalog API through the storefront's
//! [`ApiClient`]. The bearer token is kept in a [`FileStore`] under the
//! storefront data directory, so a `login` here is also seen by a
//! storefront started from the same directory.
//!
//! # Environment Variables
//!
//! - `SHAPESHIFT_API_BASE_URL` - Catalog API base URL
//! - `STOREFRONT_DATA_DIR` - Where the token is stored (default: .shapeshift)

pub mod auth;
pub mod categories;
pub mod products;
pub mod upload;

use std::path::PathBuf;
use std::sync::Arc;

use shapeshift_storefront::api::{ApiClient, ApiConfig, ApiError};
use shapeshift_storefront::config::{ConfigError, DEFAULT_DATA_DIR};
use shapeshift_storefront::storage::{FileStore, StorageError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot open data directory: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Cannot read {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Build an API client from the environment.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the data directory
/// cannot be created.
pub fn client() -> Result<ApiClient, CliError> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    let data_dir = std::env::var("STOREFRONT_DATA_DIR")
        .ok()
        .filter(|d| !d.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
    let store = Arc::new(FileStore::open(data_dir)?);

    Ok(ApiClient::new(&config, store)?)
}
