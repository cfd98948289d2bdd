//! The assembled engine
//!
//! [`Warden`] wires a config to a store, a fetcher and the notification
//! surfaces, and owns the resulting [`InterceptionRouter`]. Hosts build one
//! and share it behind an `Arc`.

use crate::config::Config;
use crate::error::WardenResult;
use crate::network::{Fetcher, HttpFetcher};
use crate::notify::{HeadlessWindows, TracingSink};
use crate::router::InterceptionRouter;
use crate::store::{self, CacheStore};
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

pub struct Warden {
    router: InterceptionRouter,
    store: Arc<dyn CacheStore>,
    config: Config,
}

impl Warden {
    /// Build with the configured store backend and a real HTTP client
    pub fn from_config(config: Config) -> WardenResult<Self> {
        let store = store::open_store(&config);
        let fetcher = Arc::new(HttpFetcher::new(&config.network));
        Self::with_parts(config, store, fetcher)
    }

    /// Build around an existing store and fetcher
    pub fn with_parts(
        config: Config,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn Fetcher>,
    ) -> WardenResult<Self> {
        debug!(
            store = store.backend_name(),
            fetcher = fetcher.fetcher_name(),
            version = %config.engine.version,
            "Building engine"
        );
        let router = InterceptionRouter::new(
            &config,
            Arc::clone(&store),
            fetcher,
            Arc::new(TracingSink),
            Arc::new(HeadlessWindows),
        )?;

        Ok(Self {
            router,
            store,
            config,
        })
    }

    pub fn router(&self) -> &InterceptionRouter {
        &self.router
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Wait for background refreshes so their writes are not lost on exit
    pub async fn drain(&self) {
        self.router.engine().refresh_pool().wait_idle().await;
    }
}

impl Deref for Warden {
    type Target = InterceptionRouter;

    fn deref(&self) -> &Self::Target {
        &self.router
    }
}
