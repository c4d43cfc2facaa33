//! Server-backed catalog.
//!
//! Reads go to the API and replace the shared [`CatalogStore`] wholesale.
//! A failed request leaves the store as it was. Mutations call the API and,
//! on success, refresh from the server rather than patching locally.
//!
//! Overlapping refreshes are not sequenced: whichever response arrives
//! last wins.

use std::sync::{Arc, Mutex, PoisonError};

use shapeshift_core::{Category, CategoryId, CategoryInput, Product, ProductId, ProductInput, ProductPatch};
use thiserror::Error;
use tracing::instrument;

use crate::api::{ApiClient, ApiError, ProductQuery};
use crate::catalog::{CatalogError, CatalogStore};

/// Errors from catalog service operations.
#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Keeps a shared [`CatalogStore`] in step with the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogService {
    api: ApiClient,
    store: Arc<Mutex<CatalogStore>>,
    query: Arc<Mutex<ProductQuery>>,
}

impl CatalogService {
    /// A service refreshing `store` with `query` as the product listing.
    pub fn new(api: ApiClient, store: Arc<Mutex<CatalogStore>>, query: ProductQuery) -> Self {
        Self {
            api,
            store,
            query: Arc::new(Mutex::new(query)),
        }
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The listing query used for refreshes.
    #[must_use]
    pub fn query(&self) -> ProductQuery {
        self.query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Change the listing query. Takes effect on the next refresh.
    pub fn set_query(&self, query: ProductQuery) {
        *self.query.lock().unwrap_or_else(PoisonError::into_inner) = query;
    }

    fn with_store<R>(&self, f: impl FnOnce(&mut CatalogStore) -> R) -> R {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *store)
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Reload products. Returns how many were loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; the store is untouched.
    #[instrument(skip(self))]
    pub async fn refresh_products(&self) -> Result<usize, ApiError> {
        let products = self.api.list_products(&self.query()).await?;
        let count = products.len();
        self.with_store(|store| store.replace_products(products));
        tracing::debug!(count, "Refreshed products");
        Ok(count)
    }

    /// Reload categories. Returns how many were loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; the store is untouched.
    #[instrument(skip(self))]
    pub async fn refresh_categories(&self) -> Result<usize, ApiError> {
        let categories = self.api.list_categories().await?;
        let count = categories.len();
        self.with_store(|store| store.replace_categories(categories));
        tracing::debug!(count, "Refreshed categories");
        Ok(count)
    }

    /// Reload products and categories concurrently, bypassing the client's
    /// listing cache.
    ///
    /// # Errors
    ///
    /// Returns the first error. Whichever half succeeded is still applied.
    pub async fn refresh(&self) -> Result<(usize, usize), ApiError> {
        self.api.invalidate_cache().await;
        let (products, categories) =
            tokio::join!(self.refresh_products(), self.refresh_categories());
        Ok((products?, categories?))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API rejects the product or the request fails.
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let product = self.api.create_product(input).await?;
        self.refresh_after_mutation().await;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns an error if the API rejects the update or the request fails.
    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let product = self.api.update_product(id, patch).await?;
        self.refresh_after_mutation().await;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.api.delete_product(id).await?;
        self.refresh_after_mutation().await;
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API rejects the category or the request fails.
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let category = self.api.create_category(input).await?;
        self.refresh_after_mutation().await;
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns an error if the API rejects the update or the request fails.
    pub async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let category = self.api.update_category(id, input).await?;
        self.refresh_after_mutation().await;
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::WildcardCategory`] for the wildcard without
    /// calling the API, or an error if the request fails.
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), CatalogServiceError> {
        if id.is_all() {
            return Err(CatalogError::WildcardCategory.into());
        }
        self.api.delete_category(id).await?;
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// The mutation already succeeded, so a failed refresh is only logged.
    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Refresh after catalog change failed");
        }
    }
}
