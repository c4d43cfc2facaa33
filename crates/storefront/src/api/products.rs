//! Product endpoints.

use reqwest::Method;
use serde_json::Value;
use shapeshift_core::{CategoryId, Price, Product, ProductId, ProductInput, ProductPatch, SortOrder};
use tracing::{debug, instrument};

use super::cache::CacheValue;
use super::{ApiClient, ApiError};
use crate::normalize::{extract_record, extract_records};

/// Query parameters for the product listing.
///
/// `page`, `limit`, `sort_by` and `sort_order` are always sent; the rest
/// only when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub brand: Option<String>,
    pub in_stock: Option<bool>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            category: None,
            min_price: None,
            max_price: None,
            sort_by: "createdAt".to_owned(),
            sort_order: SortOrder::Desc,
            brand: None,
            in_stock: None,
            color: None,
            is_active: None,
        }
    }
}

impl ProductQuery {
    /// Query-string pairs in the order the API documents them.
    ///
    /// Empty strings are skipped, as is the wildcard category.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                pairs.push((key, value));
            }
        };

        push("search", self.search.clone());
        push(
            "category",
            self.category
                .as_ref()
                .filter(|c| !c.is_all())
                .map(ToString::to_string),
        );
        push("minPrice", self.min_price.map(|p| p.amount().to_string()));
        push("maxPrice", self.max_price.map(|p| p.amount().to_string()));
        push("sortBy", Some(self.sort_by.clone()));
        push("sortOrder", Some(self.sort_order.as_str().to_owned()));
        push("brand", self.brand.clone());
        push("inStock", self.in_stock.map(|b| b.to_string()));
        push("color", self.color.clone());
        push("isActive", self.is_active.map(|b| b.to_string()));
        pairs
    }

    fn cache_key(&self) -> String {
        let query = self
            .to_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("products:{query}")
    }
}

impl ApiClient {
    /// List products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let cache_key = query.cache_key();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.url(&["products"])?;
        url.query_pairs_mut().extend_pairs(query.to_pairs());

        let response = Self::send(self.request(Method::GET, url, false)).await?;
        let products: Vec<Product> = extract_records(&response);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the response has no product, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let url = self.url(&["products", id.as_str()])?;
        let response = Self::send(self.request(Method::GET, url, false)).await?;
        extract_record(&response).ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let url = self.url(&["products"])?;
        let response = Self::send(self.request(Method::POST, url, true).json(input)).await?;
        self.invalidate_cache().await;
        saved_record(&response, "product")
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let url = self.url(&["products", id.as_str()])?;
        let response = Self::send(self.request(Method::PUT, url, true).json(patch)).await?;
        self.invalidate_cache().await;
        saved_record(&response, "product")
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let url = self.url(&["products", id.as_str()])?;
        Self::send(self.request(Method::DELETE, url, true)).await?;
        self.invalidate_cache().await;
        Ok(())
    }
}

/// The record a create/update call returned.
pub(super) fn saved_record<T: serde::de::DeserializeOwned>(
    response: &Value,
    what: &str,
) -> Result<T, ApiError> {
    extract_record(response)
        .ok_or_else(|| ApiError::NotFound(format!("response did not include the saved {what}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let pairs = ProductQuery::default().to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page", "1".to_owned()),
                ("limit", "10".to_owned()),
                ("sortBy", "createdAt".to_owned()),
                ("sortOrder", "desc".to_owned()),
            ]
        );
    }

    #[test]
    fn test_optional_filters() {
        let query = ProductQuery {
            search: Some("whey".into()),
            category: Some("protein".into()),
            min_price: Some(Price::from_units(500)),
            in_stock: Some(true),
            color: Some(String::new()),
            ..ProductQuery::default()
        };
        let pairs = query.to_pairs();
        assert!(pairs.contains(&("search", "whey".to_owned())));
        assert!(pairs.contains(&("category", "protein".to_owned())));
        assert!(pairs.contains(&("minPrice", "500".to_owned())));
        assert!(pairs.contains(&("inStock", "true".to_owned())));
        assert!(!pairs.iter().any(|(k, _)| *k == "color"));
    }

    #[test]
    fn test_wildcard_category_not_sent() {
        let query = ProductQuery {
            category: Some(CategoryId::all()),
            ..ProductQuery::default()
        };
        assert!(!query.to_pairs().iter().any(|(k, _)| *k == "category"));
    }

    #[test]
    fn test_cache_key_varies_with_query() {
        let a = ProductQuery::default();
        let b = ProductQuery {
            page: 2,
            ..ProductQuery::default()
        };
        assert_ne!(a.cache_key(), b.cache_key());
    }
}
