//! Core types for the ShapeShift storefront.
//!
//! This module provides type-safe wrappers for the catalog, cart and
//! checkout domain.

pub mod address;
pub mod category;
pub mod id;
pub mod image;
pub mod price;
pub mod product;
pub mod status;
pub mod user;

pub use address::{Address, AddressError, AddressField, AddressFields, AddressForm};
pub use category::{Category, CategoryInput, slugify};
pub use id::*;
pub use image::{Image, ImageRef, PLACEHOLDER_IMAGE, resolve_display_url};
pub use price::{CurrencyCode, IndianLocaleFormatter, Price, PriceFormatter};
pub use product::{Badge, DEFAULT_VARIANT_LABEL, Product, ProductInput, ProductPatch, ProductVariant};
pub use status::*;
pub use user::User;
