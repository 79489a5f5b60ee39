use std::sync::Arc;

use config::Config;
use fetcher::CacheAsideFetcher;
use source::DataSource;
use store::Store;

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod shutdown;
pub mod source;
pub mod store;
pub mod subscriber;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub fetcher: Arc<CacheAsideFetcher>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, source: Arc<dyn DataSource>) -> Self {
        let fetcher = CacheAsideFetcher::new(store.clone(), source, config.cache_ttl());
        Self {
            config,
            store,
            fetcher: Arc::new(fetcher),
        }
    }
}
