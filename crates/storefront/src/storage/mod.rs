//! Durable local key-value storage.
//!
//! The storefront keeps its client-side state (cart, saved addresses, the
//! locally administered catalog, the API session token) as independent JSON
//! blobs under fixed keys, the same contract a browser's local storage
//! offers.
//!
//! # Failure policy
//!
//! Persistence is best-effort. Reads that find nothing, invalid JSON, or
//! JSON of the wrong shape all come back as `None`; writes that fail are
//! logged and dropped. Losing persistence must never take the storefront
//! down, so [`load_json`] and [`save_json`] never return errors.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local, used by tests and ephemeral sessions
//! - [`FileStore`] - one JSON file per key under a data directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys for the persisted blobs.
pub mod keys {
    /// Cart line items.
    pub const CART: &str = "cart_items";

    /// Saved delivery addresses.
    pub const ADDRESSES: &str = "customer_addresses_v1";

    /// Locally administered products.
    pub const PRODUCTS: &str = "admin_products";

    /// Locally administered categories.
    pub const CATEGORIES: &str = "admin_categories";

    /// Bearer token for the upstream API.
    pub const AUTH_TOKEN: &str = "auth_token";
}

/// Errors a storage backend can report on write.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Key contains characters the backend cannot store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot remove the value.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Load and deserialize the JSON blob under `key`.
///
/// Missing keys, invalid JSON and type mismatches all yield `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable stored value");
            None
        }
    }
}

/// Serialize `value` and store it under `key`.
///
/// Failures are logged and swallowed.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|json| store.set(key, &json));

    if let Err(e) = result {
        tracing::warn!(key, error = %e, "Failed to persist value, keeping in-memory state");
    }
}
