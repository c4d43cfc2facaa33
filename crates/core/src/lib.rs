//! ShapeShift Core - Shared types library.
//!
//! This crate provides common types used across all ShapeShift components:
//! - `storefront` - Cart, address book, checkout and catalog state plus the
//!   HTTP service that exposes them
//! - `cli` - Catalog administration against the upstream REST API
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage, no
//! HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Products, categories, images, prices, addresses and
//!   type-safe IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
