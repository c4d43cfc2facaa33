//! ShapeShift Storefront library.
//!
//! Client-side state for the ShapeShift store (cart, saved addresses, the
//! catalog and the messaging checkout) plus the upstream catalog API client
//! and the JSON HTTP surface over all of it. Built as a library so the
//! binary, the CLI and the integration tests share one implementation.
//!
//! # Modules
//!
//! - [`storage`] - Durable key-value persistence
//! - [`normalize`] - Envelope-tolerant list extraction from API responses
//! - [`cart`], [`address`], [`checkout`], [`catalog`] - Storefront state
//! - [`api`] - Catalog REST client
//! - [`services`] - Catalog refresh and login session over the client
//! - [`routes`], [`state`], [`config`], [`error`] - HTTP service

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod normalize;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
