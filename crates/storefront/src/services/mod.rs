//! Services that sit between the upstream API and local state.
//!
//! - [`catalog`] - keeps the shared [`CatalogStore`](crate::catalog::CatalogStore)
//!   in step with the catalog API
//! - [`auth`] - login session and its revalidation

pub mod auth;
pub mod catalog;

pub use auth::{AuthSession, SessionState};
pub use catalog::{CatalogService, CatalogServiceError};
