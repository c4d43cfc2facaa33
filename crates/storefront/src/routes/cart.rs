//! Cart route handlers.
//!
//! Every mutation responds with the updated cart summary so clients can
//! re-render without a second request.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shapeshift_core::{Product, ProductId};
use tracing::instrument;

use crate::cart::CartSummary;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// A request naming one product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub product_id: ProductId,
}

/// Set a line's quantity. Zero or less removes the line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Open or close the cart panel.
#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub open: bool,
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

fn summary(state: &AppState) -> Json<CartSummary> {
    Json(state.cart().summary(state.formatter()))
}

/// Snapshot a product from the catalog for adding to the cart.
fn catalog_product(state: &AppState, id: &ProductId) -> Result<Product> {
    state
        .catalog()
        .product(id)
        .filter(|p| p.is_active)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Display the cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartSummary> {
    summary(&state)
}

/// Add one unit of a product.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<CartSummary>> {
    let product = catalog_product(&state, &req.product_id)?;
    state.cart().add_to_cart(&product);
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));
    Ok(summary(&state))
}

/// Add one more unit of a product.
#[instrument(skip(state))]
pub async fn increment(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<CartSummary>> {
    let product = catalog_product(&state, &req.product_id)?;
    state.cart().increment_quantity(&product);
    Ok(summary(&state))
}

/// Take one unit away, removing the line at zero.
#[instrument(skip(state))]
pub async fn decrement(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Json<CartSummary> {
    state.cart().decrement_quantity(&req.product_id);
    summary(&state)
}

/// Set a line's quantity.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Json<CartSummary> {
    state.cart().update_quantity(&req.product_id, req.quantity);
    summary(&state)
}

/// Remove a line.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Json<CartSummary> {
    state.cart().remove_from_cart(&req.product_id);
    summary(&state)
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Json<CartSummary> {
    state.cart().clear_cart();
    summary(&state)
}

/// Open or close the cart panel.
#[instrument(skip(state))]
pub async fn visibility(
    State(state): State<AppState>,
    Json(req): Json<VisibilityRequest>,
) -> Json<CartSummary> {
    state.cart().set_cart_open(req.open);
    summary(&state)
}

/// Total units in the cart.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.cart().get_total_items(),
    })
}
