//! Catalog access with response caching.
//!
//! Products change rarely and are read constantly, so reads go through a
//! `moka` cache with a 5-minute TTL. Only default listings are cached;
//! category-filtered queries go straight to the store.

use std::sync::Arc;
use std::time::Duration;

use antenka_core::ProductId;
use antenka_store::{DocumentStore, Filter, Query, SortDirection, StoreError};
use moka::future::Cache;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::Product;

const PRODUCTS_COLLECTION: &str = "products";
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes
const DEFAULT_PAGE_SIZE: u32 = 24;

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
}

/// One page of catalog products.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Errors from catalog reads.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Catalog service over the products collection.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    cache: Cache<String, CacheValue>,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self { store, cache }
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the store fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let cache_key = format!("product:{id}");

        // Check cache
        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let doc = self
            .store
            .get(PRODUCTS_COLLECTION, id.as_str())
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        let product = Product::from_document(&doc);

        // Cache the result
        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get a paginated product listing.
    ///
    /// Category-filtered listings bypass the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        category: Option<&str>,
        cursor: Option<String>,
        limit: Option<u32>,
    ) -> Result<ProductPage, CatalogError> {
        let cache_key = format!("products:{}", cursor.as_deref().unwrap_or(""));

        // Check cache (only for default listings without a category filter)
        if category.is_none()
            && let Some(CacheValue::Products(page)) = self.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let mut query = Query::all()
            .order_by("createdAt", SortDirection::Desc)
            .limit(limit.unwrap_or(DEFAULT_PAGE_SIZE));
        if let Some(category) = category {
            query = query.filter(Filter::eq("category", category));
        }
        if let Some(cursor) = cursor {
            query = query.after(cursor);
        }

        let result = self.store.query(PRODUCTS_COLLECTION, query).await?;
        let page = ProductPage {
            products: result.documents.iter().map(Product::from_document).collect(),
            next_cursor: result.next_cursor,
        };

        // Cache if not a filtered listing
        if category.is_none() {
            self.cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, id: &ProductId) {
        self.cache.invalidate(&format!("product:{id}")).await;
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
