//! HTTP route handlers for storefront.
//!
//! All endpoints speak JSON.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//! GET  /session                     - Catalog API login state
//!
//! # Catalog
//! GET  /products?search=&category=  - Filtered active products
//! GET  /products/{id}               - Product detail
//! POST /products/refresh            - Reload catalog from the API
//! GET  /categories                  - All categories, wildcard first
//!
//! # Cart
//! GET  /cart                        - Cart summary
//! POST /cart/add                    - Add one unit
//! POST /cart/increment              - Add one more unit
//! POST /cart/decrement              - Remove one unit
//! POST /cart/update                 - Set quantity
//! POST /cart/remove                 - Remove line
//! POST /cart/clear                  - Empty cart
//! POST /cart/visibility             - Open/close cart panel
//! GET  /cart/count                  - Badge count
//!
//! # Checkout
//! POST /checkout                    - Begin checkout (opens address dialog)
//! GET  /checkout/address            - Address dialog state
//! POST /checkout/address/select     - Select saved address
//! POST /checkout/address/new        - Start a new address
//! POST /checkout/address/edit       - Edit a saved address
//! POST /checkout/address/save       - Save address and complete checkout
//! POST /checkout/address/use-selected - Complete checkout with selection
//! ```

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use shapeshift_core::User;
use tracing::instrument;

use crate::services::SessionState;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/refresh", post(products::refresh))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/visibility", post(cart::visibility))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::begin))
        .route("/address", get(checkout::show_dialog))
        .route("/address/select", post(checkout::select))
        .route("/address/new", post(checkout::start_new))
        .route("/address/edit", post(checkout::start_edit))
        .route("/address/save", post(checkout::save))
        .route("/address/use-selected", post(checkout::use_selected))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/session", get(session))
        .nest("/products", product_routes())
        .route("/categories", get(products::categories))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Login state against the catalog API.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl From<SessionState> for SessionView {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Authenticated(user) => Self {
                status: "authenticated",
                user: Some(user),
            },
            SessionState::LoggedOut => Self {
                status: "logged_out",
                user: None,
            },
            SessionState::Offline => Self {
                status: "offline",
                user: None,
            },
        }
    }
}

/// Revalidate the stored token.
#[instrument(skip(state))]
async fn session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.auth().revalidate().await.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::api::{ApiConfig, DEFAULT_BASE_URL};
    use crate::checkout::{CheckoutSettings, RecordedHandoff};
    use crate::config::{CatalogSource, StorefrontConfig};
    use crate::storage::MemoryStore;

    fn test_state() -> (AppState, Arc<RecordedHandoff>) {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            api: ApiConfig::new(Url::parse(DEFAULT_BASE_URL).unwrap()),
            data_dir: PathBuf::from("unused"),
            catalog_source: CatalogSource::Local,
            checkout: CheckoutSettings::default(),
            sentry_dsn: None,
        };
        let handoff = Arc::new(RecordedHandoff::new());
        let state =
            AppState::with_parts(config, Arc::new(MemoryStore::new()), handoff.clone()).unwrap();
        (state, handoff)
    }

    async fn call(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = routes()
            .with_state(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn address_form() -> Value {
        json!({
            "name": " Asha Rao ",
            "phone": "9876543210",
            "line1": "12 MG Road",
            "line2": "",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411001"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = test_state();
        let response = routes()
            .with_state(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_products_filtered_by_search_and_category() {
        let (state, _) = test_state();

        let (status, all) = call(&state, "GET", "/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 3);

        let (_, urban) = call(&state, "GET", "/products?search=urban%20color", None).await;
        assert_eq!(urban.as_array().unwrap().len(), 2);

        let (_, makeup) = call(&state, "GET", "/products?search=urban&category=makeup", None).await;
        let makeup = makeup.as_array().unwrap();
        assert_eq!(makeup.len(), 1);
        assert_eq!(makeup[0]["id"], "uc-cc-cream");
        assert_eq!(makeup[0]["price"], "₹799");
        assert_eq!(makeup[0]["mrp"], "₹999");
    }

    #[tokio::test]
    async fn test_product_detail_and_missing_product() {
        let (state, _) = test_state();

        let (status, detail) = call(&state, "GET", "/products/clean-whey-mango", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["variant"], "Mango Twist");
        assert_eq!(detail["badges"], json!(["bestseller"]));
        assert_eq!(detail["product"]["brand"], "ShapeShift");

        let (status, body) = call(&state, "GET", "/products/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found: product nope");
    }

    #[tokio::test]
    async fn test_categories_wildcard_first() {
        let (state, _) = test_state();
        let (_, categories) = call(&state, "GET", "/categories", None).await;
        assert_eq!(categories[0]["id"], "all");
        assert_eq!(categories.as_array().unwrap().len(), 17);
    }

    #[tokio::test]
    async fn test_refresh_rejected_for_local_catalog() {
        let (state, _) = test_state();
        let (status, _) = call(&state, "POST", "/products/refresh", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cart_mutations() {
        let (state, _) = test_state();
        let whey = json!({"productId": "clean-whey-mango"});

        let (status, cart) = call(&state, "POST", "/cart/add", Some(whey.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["totalItems"], 1);

        call(&state, "POST", "/cart/increment", Some(whey.clone())).await;
        let (_, cart) = call(
            &state,
            "POST",
            "/cart/add",
            Some(json!({"productId": "uc-cc-cream"})),
        )
        .await;
        assert_eq!(cart["totalItems"], 3);
        assert_eq!(cart["totalPrice"], "₹13,257");
        assert_eq!(cart["items"][0]["productId"], "clean-whey-mango");

        let (_, cart) = call(
            &state,
            "POST",
            "/cart/update",
            Some(json!({"productId": "clean-whey-mango", "quantity": 0})),
        )
        .await;
        assert_eq!(cart["totalItems"], 1);

        call(&state, "POST", "/cart/decrement", Some(json!({"productId": "uc-cc-cream"}))).await;
        let (_, count) = call(&state, "GET", "/cart/count", None).await;
        assert_eq!(count["count"], 0);

        let (_, cart) = call(&state, "POST", "/cart/visibility", Some(json!({"open": true}))).await;
        assert_eq!(cart["isOpen"], true);
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_not_found() {
        let (state, _) = test_state();
        let (status, _) = call(&state, "POST", "/cart/add", Some(json!({"productId": "ghost"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(state.cart().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_with_empty_cart() {
        let (state, handoff) = test_state();
        let (status, body) = call(&state, "POST", "/checkout", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Your cart is empty!");
        assert_eq!(body["notifications"][0]["level"], "error");
        assert_eq!(body["dialog"]["open"], false);
        assert_eq!(handoff.count(), 0);
    }

    #[tokio::test]
    async fn test_checkout_save_new_address() {
        let (state, handoff) = test_state();
        call(&state, "POST", "/cart/add", Some(json!({"productId": "clean-whey-mango"}))).await;

        let (status, body) = call(&state, "POST", "/checkout", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dialog"]["open"], true);
        assert_eq!(body["notifications"][0]["level"], "info");

        let (status, body) = call(
            &state,
            "POST",
            "/checkout/address/save",
            Some(json!({"name": "Asha"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "phone is required");
        assert_eq!(body["dialog"]["open"], true);
        assert_eq!(handoff.count(), 0);

        let (status, body) =
            call(&state, "POST", "/checkout/address/save", Some(address_form())).await;
        assert_eq!(status, StatusCode::OK);
        let url = body["handoffUrl"].as_str().unwrap();
        assert!(url.starts_with("https://wa.me/918975944936?text="));
        assert_eq!(handoff.last().unwrap().as_str(), url);
        assert_eq!(body["notifications"][0]["message"], "Opening WhatsApp to complete your order!");
        assert_eq!(body["dialog"]["addresses"][0]["name"], "Asha Rao");
        assert!(state.cart().is_empty());
        assert!(!state.cart().is_cart_open());
    }

    #[tokio::test]
    async fn test_checkout_use_selected_address() {
        let (state, handoff) = test_state();
        let item = json!({"productId": "uc-hydra-veil-primer"});

        call(&state, "POST", "/cart/add", Some(item.clone())).await;
        call(&state, "POST", "/checkout", None).await;
        call(&state, "POST", "/checkout/address/save", Some(address_form())).await;

        call(&state, "POST", "/cart/add", Some(item)).await;
        let (_, body) = call(&state, "POST", "/checkout", None).await;
        let saved_id = body["dialog"]["selectedId"].clone();
        assert!(saved_id.is_string());

        let (_, dialog) = call(&state, "POST", "/checkout/address/new", None).await;
        assert_eq!(dialog["form"]["name"], "");

        call(
            &state,
            "POST",
            "/checkout/address/select",
            Some(json!({"addressId": saved_id})),
        )
        .await;
        let (status, body) = call(&state, "POST", "/checkout/address/use-selected", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["handoffUrl"].is_string());
        assert_eq!(handoff.count(), 2);
    }

    #[tokio::test]
    async fn test_address_dialog_closed_outside_checkout() {
        let (state, handoff) = test_state();
        let item = json!({"productId": "uc-hydra-veil-primer"});

        call(&state, "POST", "/cart/add", Some(item.clone())).await;
        call(&state, "POST", "/checkout", None).await;
        let (_, body) = call(&state, "POST", "/checkout/address/save", Some(address_form())).await;
        let saved_id = body["dialog"]["selectedId"].clone();
        assert_eq!(handoff.count(), 1);

        call(&state, "POST", "/cart/add", Some(item)).await;
        let (status, body) = call(&state, "POST", "/checkout/address/use-selected", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "address dialog is not open");
        assert_eq!(handoff.count(), 1);
        assert!(!state.cart().is_empty());

        let (status, _) = call(&state, "POST", "/checkout/address/save", Some(address_form())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.addresses().len(), 1);

        let (status, body) = call(
            &state,
            "POST",
            "/checkout/address/select",
            Some(json!({"addressId": saved_id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "address dialog is not open");
        let (status, _) = call(&state, "POST", "/checkout/address/new", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(handoff.count(), 1);
    }

    #[tokio::test]
    async fn test_session_without_token_is_logged_out() {
        let (state, _) = test_state();
        let (status, body) = call(&state, "GET", "/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "logged_out");
    }
}
