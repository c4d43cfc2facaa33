//! Product commands.
//!
//! # Usage
//!
//! ```bash
//! shapeshift-cli products list --search whey --category protein
//! shapeshift-cli products show clean-whey-mango
//! shapeshift-cli products create --name "Clean Whey" --category protein \
//!     --price 6229 --mrp 7499 --discount 17 --brand ShapeShift --tag bestseller
//! shapeshift-cli products set-active clean-whey-mango false
//! shapeshift-cli products delete clean-whey-mango
//! ```

use rust_decimal::Decimal;
use shapeshift_core::{
    CategoryId, Image, Price, Product, ProductId, ProductInput, ProductPatch, SortOrder,
};
use shapeshift_storefront::api::ProductQuery;
use tracing::info;

use super::{CliError, client};
use crate::output;

/// Listing filters.
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub ascending: bool,
    pub json: bool,
}

impl ListArgs {
    fn to_query(&self) -> ProductQuery {
        let defaults = ProductQuery::default();
        ProductQuery {
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
            search: self.search.clone(),
            category: self.category.as_deref().map(CategoryId::from),
            sort_order: if self.ascending {
                SortOrder::Asc
            } else {
                SortOrder::Desc
            },
            ..defaults
        }
    }
}

/// Fields for a new product.
#[derive(Debug, Clone)]
pub struct CreateArgs {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub mrp: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub inactive: bool,
}

impl CreateArgs {
    /// Build the API payload. MRP defaults to the price.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank name or negative amounts.
    fn into_input(self) -> Result<ProductInput, CliError> {
        if self.name.trim().is_empty() {
            return Err(CliError::Invalid("product name is required".to_string()));
        }
        let mrp = self.mrp.unwrap_or(self.price);
        if self.price.is_sign_negative() || mrp.is_sign_negative() {
            return Err(CliError::Invalid("prices cannot be negative".to_string()));
        }

        Ok(ProductInput {
            name: self.name.trim().to_owned(),
            description: self.description.unwrap_or_default(),
            mrp: Price::new(mrp),
            price: Price::new(self.price),
            discount_percent: self.discount,
            category: CategoryId::from(self.category.trim()),
            brand: self.brand,
            images: self.images.iter().map(|url| Image::from(url.as_str())).collect(),
            variants: Vec::new(),
            specifications: std::collections::BTreeMap::new(),
            tags: self.tags,
            is_active: Some(!self.inactive),
        })
    }
}

fn print_products(products: &[Product], json: bool) -> Result<(), CliError> {
    if json {
        return output::json(products);
    }
    if products.is_empty() {
        output::line("No products");
    }
    for product in products {
        output::line(&output::product_row(product));
    }
    Ok(())
}

/// List products.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn list(args: &ListArgs) -> Result<(), CliError> {
    let products = client()?.list_products(&args.to_query()).await?;
    print_products(&products, args.json)
}

/// Show one product as JSON.
///
/// # Errors
///
/// Returns an error if the product does not exist or the request fails.
pub async fn show(id: &str) -> Result<(), CliError> {
    let product = client()?.get_product(&ProductId::from(id)).await?;
    output::json(&product)
}

/// Create a product.
///
/// # Errors
///
/// Returns an error for invalid arguments or if the API rejects the product.
pub async fn create(args: CreateArgs) -> Result<(), CliError> {
    let input = args.into_input()?;
    let product = client()?.create_product(&input).await?;
    info!(id = %product.id, name = %product.name, "Product created");
    output::line(product.id.as_str());
    Ok(())
}

/// Delete a product.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn delete(id: &str) -> Result<(), CliError> {
    client()?.delete_product(&ProductId::from(id)).await?;
    info!(id, "Product deleted");
    Ok(())
}

/// Show or hide a product in the storefront.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn set_active(id: &str, active: bool) -> Result<(), CliError> {
    let patch = ProductPatch {
        is_active: Some(active),
        ..ProductPatch::default()
    };
    let product = client()?.update_product(&ProductId::from(id), &patch).await?;
    info!(id = %product.id, active = product.is_active, "Product updated");
    Ok(())
}
