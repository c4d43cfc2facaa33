//! Product and category route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shapeshift_core::{Badge, Category, CategoryId, Price, PriceFormatter, Product, ProductId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product card display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub category: CategoryId,
    pub variant: String,
    pub image: String,
    pub price: String,
    pub mrp: Option<String>,
    pub discount_percent: String,
    pub badges: Vec<Badge>,
    /// Units of this product already in the cart.
    pub in_cart: u32,
}

impl ProductCard {
    fn new(product: &Product, formatter: &dyn PriceFormatter, in_cart: u32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            variant: product.variant_label().to_owned(),
            image: product.display_image().to_owned(),
            price: formatter.format(product.price),
            mrp: format_mrp(product.mrp, product.price, formatter),
            discount_percent: product.discount_percent.normalize().to_string(),
            badges: product.badges(),
            in_cart,
        }
    }
}

/// The struck-through MRP is only shown when it is above the price.
fn format_mrp(mrp: Price, price: Price, formatter: &dyn PriceFormatter) -> Option<String> {
    (mrp.amount() > price.amount()).then(|| formatter.format(mrp))
}

/// Product detail: the card plus the full record.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub card: ProductCard,
    pub product: Product,
}

/// Listing filter query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    pub category: Option<CategoryId>,
}

/// Result of a catalog refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResult {
    pub products: usize,
    pub categories: usize,
}

/// Active products passing the search and category filter.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<ProductCard>> {
    let category = query.category.unwrap_or_else(CategoryId::all);
    let cart = state.cart();
    let catalog = state.catalog();

    let cards = catalog
        .filter(query.search.trim(), &category)
        .into_iter()
        .map(|p| ProductCard::new(p, state.formatter(), cart.get_item_quantity(&p.id)))
        .collect();
    Json(cards)
}

/// One product by id, active or not.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let in_cart = state.cart().get_item_quantity(&id);
    let catalog = state.catalog();
    let product = catalog
        .product(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductDetail {
        card: ProductCard::new(product, state.formatter(), in_cart),
        product: product.clone(),
    }))
}

/// All categories, wildcard first.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.catalog().categories().cloned().collect())
}

/// Reload products and categories from the catalog API.
#[instrument(skip(state))]
pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshResult>> {
    if !state.is_catalog_remote() {
        return Err(AppError::BadRequest(
            "catalog is managed locally".to_string(),
        ));
    }
    let (products, categories) = state.catalog_service().refresh().await?;
    Ok(Json(RefreshResult {
        products,
        categories,
    }))
}
