//! Catalog refresh and admin mutations against the mock catalog API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use secrecy::SecretString;
use shapeshift_core::{CategoryId, CategoryInput, Price, ProductId, ProductInput, ProductPatch};
use shapeshift_integration_tests::{MockCatalogApi, PASSWORD};
use shapeshift_storefront::api::{ApiClient, ApiConfig, ApiError, ProductQuery, UploadFile};
use shapeshift_storefront::catalog::{CatalogError, CatalogStore};
use shapeshift_storefront::services::{CatalogService, CatalogServiceError};
use shapeshift_storefront::storage::MemoryStore;

struct Fixture {
    api: MockCatalogApi,
    service: CatalogService,
    store: Arc<Mutex<CatalogStore>>,
}

impl Fixture {
    async fn new() -> Self {
        let api = MockCatalogApi::spawn().await;
        let client = ApiClient::new(
            &ApiConfig::new(api.base_url().clone()),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();
        let store = Arc::new(Mutex::new(CatalogStore::new()));
        let service = CatalogService::new(client, store.clone(), ProductQuery::default());
        Self {
            api,
            service,
            store,
        }
    }

    async fn logged_in() -> Self {
        let fixture = Self::new().await;
        fixture
            .service
            .api()
            .login("admin@example.com", &SecretString::from(PASSWORD.to_owned()))
            .await
            .unwrap();
        fixture
    }

    fn product_ids(&self) -> Vec<String> {
        let store = self.store.lock().unwrap();
        store.products().map(|p| p.id.to_string()).collect()
    }

    fn category_ids(&self) -> Vec<String> {
        let store = self.store.lock().unwrap();
        store.categories().map(|c| c.id.to_string()).collect()
    }
}

fn product_input() -> ProductInput {
    ProductInput {
        name: "Creatine Monohydrate".to_string(),
        description: "Micronised".to_string(),
        mrp: Price::from_units(1499),
        price: Price::from_units(1199),
        discount_percent: Some(Decimal::from(20)),
        category: CategoryId::from("supplements"),
        brand: Some("ShapeShift".to_string()),
        images: Vec::new(),
        variants: Vec::new(),
        specifications: std::collections::BTreeMap::new(),
        tags: vec!["new".to_string()],
        is_active: Some(true),
    }
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_replaces_store() {
    let fixture = Fixture::new().await;

    let (products, categories) = fixture.service.refresh().await.unwrap();
    assert_eq!(products, 3);
    assert_eq!(categories, 3);

    assert_eq!(
        fixture.product_ids(),
        ["clean-whey-mango", "uc-cc-cream", "retired-bar"]
    );
    assert_eq!(
        fixture.category_ids(),
        ["all", "supplements", "protein", "makeup"]
    );

    let store = fixture.store.lock().unwrap();
    let whey = store.product(&ProductId::from("clean-whey-mango")).unwrap();
    assert_eq!(whey.category.as_str(), "protein");
    assert_eq!(whey.variant_label(), "Mango Twist");
    let protein = store.category(&CategoryId::from("protein")).unwrap();
    assert_eq!(protein.parent_category, Some(CategoryId::from("supplements")));
}

#[tokio::test]
async fn test_listing_query_sent_upstream() {
    let fixture = Fixture::new().await;
    fixture.service.set_query(ProductQuery {
        search: Some("whey".to_string()),
        category: Some(CategoryId::all()),
        ..ProductQuery::default()
    });

    fixture.service.refresh_products().await.unwrap();
    assert_eq!(fixture.api.count("GET /api/v1/products"), 1);
}

#[tokio::test]
async fn test_failed_refresh_leaves_store_untouched() {
    let fixture = Fixture::new().await;
    fixture.service.refresh().await.unwrap();

    fixture.api.with_data(|data| {
        data.products_status = 503;
        data.categories.clear();
    });
    let err = fixture.service.refresh().await.unwrap_err();
    assert_eq!(err.status(), Some(503));

    // Products failed and were kept; categories succeeded and were applied.
    assert_eq!(fixture.product_ids().len(), 3);
    assert_eq!(fixture.category_ids(), ["all"]);
}

#[tokio::test]
async fn test_refresh_bypasses_listing_cache() {
    let fixture = Fixture::new().await;
    fixture.service.refresh().await.unwrap();
    fixture.service.refresh().await.unwrap();

    assert_eq!(fixture.api.count("GET /api/v1/products"), 2);
    assert_eq!(fixture.api.count("GET /api/v1/categories"), 2);
}

#[tokio::test]
async fn test_plain_listing_is_cached() {
    let fixture = Fixture::new().await;
    let client = fixture.service.api();
    let query = ProductQuery::default();

    client.list_products(&query).await.unwrap();
    client.list_products(&query).await.unwrap();
    assert_eq!(fixture.api.count("GET /api/v1/products"), 1);
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_create_product_refreshes_store() {
    let fixture = Fixture::logged_in().await;

    let product = fixture
        .service
        .create_product(&product_input())
        .await
        .unwrap();
    assert_eq!(product.id.as_str(), "p-1");
    assert_eq!(product.price, Price::from_units(1199));

    assert!(fixture.product_ids().contains(&"p-1".to_string()));
    assert_eq!(fixture.api.count("GET /api/v1/products"), 1);
}

#[tokio::test]
async fn test_update_product_refreshes_store() {
    let fixture = Fixture::logged_in().await;
    fixture.service.refresh().await.unwrap();

    let patch = ProductPatch {
        is_active: Some(true),
        ..ProductPatch::default()
    };
    let product = fixture
        .service
        .update_product(&ProductId::from("retired-bar"), &patch)
        .await
        .unwrap();
    assert!(product.is_active);

    let store = fixture.store.lock().unwrap();
    assert_eq!(store.active_products().count(), 3);
}

#[tokio::test]
async fn test_delete_product_refreshes_store() {
    let fixture = Fixture::logged_in().await;
    fixture.service.refresh().await.unwrap();

    fixture
        .service
        .delete_product(&ProductId::from("uc-cc-cream"))
        .await
        .unwrap();
    assert_eq!(fixture.product_ids(), ["clean-whey-mango", "retired-bar"]);
}

#[tokio::test]
async fn test_mutation_without_login_is_rejected() {
    let fixture = Fixture::new().await;
    fixture.service.refresh().await.unwrap();

    let err = fixture
        .service
        .delete_product(&ProductId::from("uc-cc-cream"))
        .await
        .unwrap_err();
    assert!(err.is_auth_failure());
    assert_eq!(fixture.product_ids().len(), 3);
}

#[tokio::test]
async fn test_create_and_delete_category() {
    let fixture = Fixture::logged_in().await;

    let input = CategoryInput {
        name: "pre-workout".to_string(),
        display_name: "Pre Workout".to_string(),
        parent_category: Some(CategoryId::from("supplements")),
        level: Some(1),
        ..CategoryInput::default()
    };
    let category = fixture.service.create_category(&input).await.unwrap();
    assert_eq!(category.id.as_str(), "pre-workout");
    assert!(fixture.category_ids().contains(&"pre-workout".to_string()));

    fixture
        .service
        .delete_category(&CategoryId::from("pre-workout"))
        .await
        .unwrap();
    assert!(!fixture.category_ids().contains(&"pre-workout".to_string()));
}

#[tokio::test]
async fn test_delete_wildcard_category_makes_no_request() {
    let fixture = Fixture::logged_in().await;
    let before = fixture.api.requests().len();

    let err = fixture
        .service
        .delete_category(&CategoryId::all())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::Catalog(CatalogError::WildcardCategory)
    ));
    assert_eq!(fixture.api.requests().len(), before);
}

#[tokio::test]
async fn test_get_category_with_embedded_parent() {
    let fixture = Fixture::new().await;
    let category = fixture
        .service
        .api()
        .get_category(&CategoryId::from("protein"))
        .await
        .unwrap();
    assert_eq!(category.label(), "Protein");
    assert_eq!(category.parent_category, Some(CategoryId::from("supplements")));
    assert!(!category.is_top_level());
}

#[tokio::test]
async fn test_get_missing_product() {
    let fixture = Fixture::new().await;
    let err = fixture
        .service
        .api()
        .get_product(&ProductId::from("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
}

// =============================================================================
// Uploads
// =============================================================================

#[tokio::test]
async fn test_upload_files() {
    let fixture = Fixture::logged_in().await;
    let file = UploadFile {
        file_name: "whey.png".to_string(),
        content_type: Some("image/png".to_string()),
        bytes: b"\x89PNG".to_vec(),
    };

    let uploaded = fixture.service.api().upload_files(vec![file]).await.unwrap();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(
        uploaded[0].detail_url.as_deref(),
        Some("https://cdn.example/d-1.webp")
    );
    assert_eq!(uploaded[0].original_name.as_deref(), Some("whey.png"));
    assert!(!uploaded[0].reused);
    assert_eq!(fixture.api.count("POST /api/v1/uploads"), 1);
}
