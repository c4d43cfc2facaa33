//! Category endpoints.

use reqwest::Method;
use shapeshift_core::{Category, CategoryId, CategoryInput};
use tracing::{debug, instrument};

use super::cache::{CATEGORIES_KEY, CacheValue};
use super::products::saved_record;
use super::{ApiClient, ApiError};
use crate::normalize::{extract_record, extract_records};

impl ApiClient {
    /// List all categories, with subcategories embedded where the API
    /// provides them.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(CATEGORIES_KEY).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.url(&["categories"])?;
        let response = Self::send(self.request(Method::GET, url, false)).await?;
        let categories: Vec<Category> = extract_records(&response);

        self.inner
            .cache
            .insert(
                CATEGORIES_KEY.to_owned(),
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Get a single category.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the response has no category, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let url = self.url(&["categories", id.as_str()])?;
        let response = Self::send(self.request(Method::GET, url, true)).await?;
        extract_record(&response)
            .ok_or_else(|| ApiError::NotFound(format!("Category not found: {id}")))
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let url = self.url(&["categories"])?;
        let response = Self::send(self.request(Method::POST, url, true).json(input)).await?;
        self.invalidate_cache().await;
        saved_record(&response, "category")
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let url = self.url(&["categories", id.as_str()])?;
        let response = Self::send(self.request(Method::PUT, url, true).json(input)).await?;
        self.invalidate_cache().await;
        saved_record(&response, "category")
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), ApiError> {
        let url = self.url(&["categories", id.as_str()])?;
        Self::send(self.request(Method::DELETE, url, true)).await?;
        self.invalidate_cache().await;
        Ok(())
    }
}
