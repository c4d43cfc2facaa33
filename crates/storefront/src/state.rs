//! Application state shared across handlers.
//!
//! There is one storefront per process: one cart, one address book, one
//! catalog. Handlers lock what they touch. When a handler needs both the
//! cart and the address book it locks the cart first.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shapeshift_core::{IndianLocaleFormatter, PriceFormatter};

use crate::address::AddressBook;
use crate::api::{ApiClient, ApiError, ProductQuery};
use crate::cart::CartStore;
use crate::catalog::CatalogStore;
use crate::checkout::{Checkout, CheckoutComposer, HandoffChannel, LoggedHandoff};
use crate::config::{CatalogSource, StorefrontConfig};
use crate::services::{AuthSession, CatalogService};
use crate::storage::{FileStore, KeyValueStore, StorageError};

/// Products fetched per catalog refresh.
const CATALOG_PAGE_SIZE: u32 = 100;

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to open data directory: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to build API client: {0}")]
    Api(#[from] ApiError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cart: Mutex<CartStore>,
    addresses: Mutex<AddressBook>,
    catalog: Arc<Mutex<CatalogStore>>,
    catalog_service: CatalogService,
    auth: AuthSession,
    checkout: Checkout,
    formatter: Arc<dyn PriceFormatter>,
    handoff: Arc<dyn HandoffChannel>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state persisted under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the HTTP
    /// client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let store = Arc::new(FileStore::open(config.data_dir.clone())?);
        Self::with_parts(config, store, Arc::new(LoggedHandoff)).map_err(StateError::from)
    }

    /// Create state over an explicit store and handoff channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_parts(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
        handoff: Arc<dyn HandoffChannel>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api, store.clone())?;
        let formatter: Arc<dyn PriceFormatter> = Arc::new(IndianLocaleFormatter::default());

        let catalog = Arc::new(Mutex::new(match config.catalog_source {
            CatalogSource::Remote => CatalogStore::new(),
            CatalogSource::Local => CatalogStore::load_local(store.clone()),
        }));
        let query = ProductQuery {
            limit: CATALOG_PAGE_SIZE,
            ..ProductQuery::default()
        };
        let catalog_service = CatalogService::new(api.clone(), catalog.clone(), query);
        let checkout = Checkout::new(CheckoutComposer::new(
            config.checkout.clone(),
            formatter.clone(),
        ));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cart: Mutex::new(CartStore::load(store.clone())),
                addresses: Mutex::new(AddressBook::new(store)),
                catalog,
                catalog_service,
                auth: AuthSession::new(api),
                checkout,
                formatter,
                handoff,
                config,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Lock the cart.
    pub fn cart(&self) -> MutexGuard<'_, CartStore> {
        self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the address book.
    pub fn addresses(&self) -> MutexGuard<'_, AddressBook> {
        self.inner
            .addresses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the catalog. Do not hold the guard across an `.await`.
    pub fn catalog(&self) -> MutexGuard<'_, CatalogStore> {
        self.inner
            .catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn catalog_service(&self) -> &CatalogService {
        &self.inner.catalog_service
    }

    #[must_use]
    pub fn auth(&self) -> &AuthSession {
        &self.inner.auth
    }

    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }

    #[must_use]
    pub fn formatter(&self) -> &dyn PriceFormatter {
        self.inner.formatter.as_ref()
    }

    #[must_use]
    pub fn handoff(&self) -> &dyn HandoffChannel {
        self.inner.handoff.as_ref()
    }

    /// Whether products come from the catalog API.
    #[must_use]
    pub fn is_catalog_remote(&self) -> bool {
        self.inner.config.catalog_source == CatalogSource::Remote
    }
}
