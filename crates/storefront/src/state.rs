//! Application state shared across handlers.

use std::sync::Arc;

use antenka_store::{DocumentStore, RestStore};

use crate::cart::CartService;
use crate::catalog::CatalogService;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the store clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn DocumentStore>,
    catalog: CatalogService,
    cart: CartService,
}

impl AppState {
    /// Create the application state backed by the hosted document API.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(RestStore::new(&config.doc_api));
        Self::with_store(config, store)
    }

    /// Create the application state over an explicit store implementation.
    ///
    /// Tests and local runs inject a `MemoryStore` here.
    #[must_use]
    pub fn with_store(config: StorefrontConfig, store: Arc<dyn DocumentStore>) -> Self {
        let catalog = CatalogService::new(store.clone());
        let cart = CartService::new(store.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
                cart,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.store
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }
}
