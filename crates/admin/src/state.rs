//! Application state shared across handlers.

use std::sync::Arc;

use antenka_store::{DocumentStore, FileCache, LocalCache, RestStore};

use crate::assistant::AssistantClient;
use crate::config::AdminConfig;
use crate::stats::StatsAggregator;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the store clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: Arc<dyn DocumentStore>,
    stats: Arc<StatsAggregator>,
    assistant: AssistantClient,
}

impl AppState {
    /// Create the application state backed by the hosted document API and
    /// the file-persisted stats cache.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(RestStore::new(&config.doc_api));
        let cache: Arc<dyn LocalCache> = Arc::new(FileCache::open(&config.stats_cache_path));
        Self::with_parts(config, store, cache)
    }

    /// Create the application state over explicit collaborators.
    ///
    /// Tests inject a `MemoryStore` and a `MemoryCache` here.
    #[must_use]
    pub fn with_parts(
        config: AdminConfig,
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn LocalCache>,
    ) -> Self {
        let stats = StatsAggregator::new(store.clone(), cache);
        let assistant = AssistantClient::new(&config.assistant);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                stats,
                assistant,
            }),
        }
    }

    /// Start the background stats poller.
    pub fn start_stats_polling(&self) {
        self.inner.stats.start_polling();
    }

    /// Stop background tasks ahead of shutdown.
    pub fn shutdown(&self) {
        self.inner.stats.shutdown();
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.store
    }

    /// Get a reference to the stats aggregator.
    #[must_use]
    pub fn stats(&self) -> &Arc<StatsAggregator> {
        &self.inner.stats
    }

    /// Get a reference to the assistant client.
    #[must_use]
    pub fn assistant(&self) -> &AssistantClient {
        &self.inner.assistant
    }
}
