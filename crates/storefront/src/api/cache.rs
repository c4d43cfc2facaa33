//! Cache types for catalog API responses.

use shapeshift_core::{Category, Product};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Categories(Vec<Category>),
}

/// Cache key for the category listing.
pub const CATEGORIES_KEY: &str = "categories";
