//! Integration tests for ShapeShift.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shapeshift-integration-tests
//! ```
//!
//! No external services are needed: [`MockCatalogApi`] serves an in-memory
//! stand-in for the catalog REST API on a random local port, wrapping its
//! responses in the same inconsistent envelopes the real service uses.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Browse, cart, address and checkout over HTTP
//! - `auth_session` - Login and token revalidation
//! - `catalog_service` - Catalog refresh and admin mutations

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use url::Url;

/// Password the mock accepts for any email.
pub const PASSWORD: &str = "correct horse battery staple";

/// Token the mock issues on login.
pub const TOKEN: &str = "mock-token-7f3a";

/// In-memory data behind the mock API.
#[derive(Debug)]
pub struct MockData {
    pub products: Vec<Value>,
    pub categories: Vec<Value>,
    /// Status forced on `GET /products`; 200 serves the list.
    pub products_status: u16,
    /// Status forced on `GET /auth/profile`; 200 checks the token.
    pub profile_status: u16,
    /// `METHOD /path` of every request, in arrival order.
    pub requests: Vec<String>,
    next_id: u32,
}

impl Default for MockData {
    fn default() -> Self {
        Self {
            products: vec![
                json!({
                    "_id": "clean-whey-mango",
                    "name": "Clean Whey",
                    "description": "24g protein per serving",
                    "mrp": 7499,
                    "price": 6229,
                    "discountPercent": 17,
                    "category": {"_id": "protein", "name": "protein", "displayName": "Protein"},
                    "brand": "ShapeShift",
                    "images": [{"detail": {"url": "https://cdn.example/whey.webp"}}],
                    "variants": [{"color": "Mango Twist", "stock": 50}],
                    "tags": ["bestseller"],
                    "isActive": true
                }),
                json!({
                    "_id": "uc-cc-cream",
                    "name": "All-In-One CC Cream SPF 20",
                    "description": "Color-correcting pigments",
                    "mrp": 999,
                    "price": 799,
                    "discountPercent": 20,
                    "category": "makeup",
                    "brand": "Urban Color",
                    "images": ["https://cdn.example/cc.jpg"],
                    "tags": ["makeup"],
                    "isActive": true
                }),
                json!({
                    "_id": "retired-bar",
                    "name": "Retired Protein Bar",
                    "mrp": 120,
                    "price": 99,
                    "category": "protein",
                    "isActive": false
                }),
            ],
            categories: vec![
                json!({
                    "_id": "supplements",
                    "name": "supplements",
                    "displayName": "Supplements",
                    "parentCategory": null,
                    "level": 0,
                    "subcategories": [
                        {"_id": "protein", "name": "protein", "displayName": "Protein", "parentCategory": "supplements", "level": 1}
                    ]
                }),
                json!({
                    "_id": "protein",
                    "name": "protein",
                    "displayName": "Protein",
                    "parentCategory": {"_id": "supplements", "name": "supplements"},
                    "level": 1
                }),
                json!({"_id": "makeup", "name": "makeup", "displayName": "Makeup", "level": 0}),
            ],
            products_status: 200,
            profile_status: 200,
            requests: Vec::new(),
            next_id: 1,
        }
    }
}

type Shared = Arc<Mutex<MockData>>;

/// A running mock catalog API.
#[derive(Debug, Clone)]
pub struct MockCatalogApi {
    base_url: Url,
    data: Shared,
}

impl MockCatalogApi {
    /// Serve the default data on `127.0.0.1:<random>`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let data: Shared = Arc::default();
        let app = Router::new().nest("/api/v1", routes()).with_state(data.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock API");
        let addr = listener.local_addr().expect("mock API address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = Url::parse(&format!("http://{addr}/api/v1")).expect("mock API URL");
        Self { base_url, data }
    }

    /// Base URL including `/api/v1`.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Inspect or change the mock's data.
    pub fn with_data<R>(&self, f: impl FnOnce(&mut MockData) -> R) -> R {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut data)
    }

    /// Requests received so far, as `METHOD /path`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.with_data(|d| d.requests.clone())
    }

    /// How many requests matched `METHOD /path` exactly.
    #[must_use]
    pub fn count(&self, request: &str) -> usize {
        self.with_data(|d| d.requests.iter().filter(|r| *r == request).count())
    }
}

fn routes() -> Router<Shared> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).delete(delete_category),
        )
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
        .route("/uploads", post(uploads))
}

type Reply = (StatusCode, Json<Value>);

fn record<'a>(data: &'a Shared, method: &Method, uri: &Uri) -> MutexGuard<'a, MockData> {
    let mut data = data.lock().unwrap_or_else(PoisonError::into_inner);
    data.requests.push(format!("{method} {}", uri.path()));
    data
}

fn ok(data: Value) -> Reply {
    (StatusCode::OK, Json(json!({"success": true, "data": data})))
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({"success": false, "message": message})))
}

fn id_of(value: &Value) -> Option<&str> {
    value.get("_id").and_then(Value::as_str)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn list_products(State(data): State<Shared>, method: Method, uri: Uri) -> Reply {
    let data = record(&data, &method, &uri);
    if data.products_status != 200 {
        let status =
            StatusCode::from_u16(data.products_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return fail(status, "Products unavailable");
    }
    // Paginated envelope: { data: { docs: [...] } }
    ok(json!({"docs": data.products, "totalDocs": data.products.len(), "page": 1}))
}

async fn get_product(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> Reply {
    let data = record(&data, &method, &uri);
    data.products
        .iter()
        .find(|p| id_of(p) == Some(id.as_str()))
        .map_or_else(
            || fail(StatusCode::NOT_FOUND, "Product not found"),
            |p| ok(p.clone()),
        )
}

async fn create_product(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    let mut data = record(&data, &method, &uri);
    if !authorized(&headers) {
        return fail(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    let id = format!("p-{}", data.next_id);
    data.next_id += 1;
    if let Some(map) = body.as_object_mut() {
        map.insert("_id".to_owned(), json!(id));
        map.entry("isActive").or_insert(json!(true));
    }
    data.products.push(body.clone());
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Product created", "data": body})),
    )
}

async fn update_product(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Reply {
    let mut data = record(&data, &method, &uri);
    if !authorized(&headers) {
        return fail(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    let Some(product) = data
        .products
        .iter_mut()
        .find(|p| id_of(p) == Some(id.as_str()))
    else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    if let (Some(target), Some(changes)) = (product.as_object_mut(), patch.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    ok(product.clone())
}

async fn delete_product(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut data = record(&data, &method, &uri);
    if !authorized(&headers) {
        return fail(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    data.products.retain(|p| id_of(p) != Some(id.as_str()));
    (StatusCode::OK, Json(json!({"success": true, "message": "Product deleted"})))
}

async fn list_categories(State(data): State<Shared>, method: Method, uri: Uri) -> Reply {
    let data = record(&data, &method, &uri);
    // Flat envelope: { data: [...] }
    ok(Value::Array(data.categories.clone()))
}

async fn get_category(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> Reply {
    let data = record(&data, &method, &uri);
    data.categories
        .iter()
        .find(|c| id_of(c) == Some(id.as_str()))
        .map_or_else(
            || fail(StatusCode::NOT_FOUND, "Category not found"),
            |c| ok(c.clone()),
        )
}

async fn create_category(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    let mut data = record(&data, &method, &uri);
    if !authorized(&headers) {
        return fail(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    let id = body
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("category")
        .to_owned();
    if let Some(map) = body.as_object_mut() {
        map.insert("_id".to_owned(), json!(id));
    }
    data.categories.push(body.clone());
    ok(body)
}

async fn delete_category(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut data = record(&data, &method, &uri);
    if !authorized(&headers) {
        return fail(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    data.categories.retain(|c| id_of(c) != Some(id.as_str()));
    (StatusCode::NO_CONTENT, Json(Value::Null))
}

async fn login(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Reply {
    drop(record(&data, &method, &uri));
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    if body.get("password").and_then(Value::as_str) != Some(PASSWORD) {
        return fail(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    ok(json!({
        "token": TOKEN,
        "refreshToken": "mock-refresh",
        "user": {"_id": "u-1", "name": "Store Admin", "email": email, "role": "admin"}
    }))
}

async fn profile(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Reply {
    let data = record(&data, &method, &uri);
    if data.profile_status != 200 {
        let status =
            StatusCode::from_u16(data.profile_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return fail(status, "Profile unavailable");
    }
    if !authorized(&headers) {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    ok(json!({
        "user": {"_id": "u-1", "name": "Store Admin", "email": "admin@example.com", "role": "admin"}
    }))
}

async fn uploads(
    State(data): State<Shared>,
    method: Method,
    uri: Uri,
    body: axum::body::Bytes,
) -> Reply {
    drop(record(&data, &method, &uri));
    if body.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "No files uploaded");
    }
    (
        StatusCode::OK,
        Json(json!({"results": [{
            "ok": true,
            "originalName": "whey.png",
            "detail": {"filename": "d-1.webp", "url": "https://cdn.example/d-1.webp"},
            "thumb": {"filename": "t-1.webp", "url": "https://cdn.example/t-1.webp"}
        }]})),
    )
}
