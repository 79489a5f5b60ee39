//! 旁路缓存读取
//!
//! 先查缓存，未命中时同步调用数据源并回填缓存。不缓存失败结果，
//! 也不做击穿保护：同一 id 的并发未命中会各自调用数据源并各自写入，以最后一次写入为准。

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::RecordCacheOperations;
use crate::error::AppError;
use crate::source::{DataSource, Record};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Cache,
    Api,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fetched {
    #[serde(rename = "source")]
    pub origin: Origin,
    #[serde(rename = "data")]
    pub record: Record,
}

pub struct CacheAsideFetcher {
    store: Arc<dyn Store>,
    source: Arc<dyn DataSource>,
    ttl: Duration,
}

impl CacheAsideFetcher {
    pub fn new(store: Arc<dyn Store>, source: Arc<dyn DataSource>, ttl: Duration) -> Self {
        Self { store, source, ttl }
    }

    pub async fn fetch(&self, id: &str) -> Result<Fetched, AppError> {
        let cached = RecordCacheOperations::get_cached_record(self.store.as_ref(), id).await?;
        if let Some(record) = cached {
            tracing::debug!("Cache hit for {}", id);
            return Ok(Fetched {
                origin: Origin::Cache,
                record,
            });
        }

        tracing::debug!("Cache miss for {}, fetching from source", id);
        let record = self.source.fetch(id).await?;
        RecordCacheOperations::cache_record(self.store.as_ref(), &record, self.ttl).await?;

        Ok(Fetched {
            origin: Origin::Api,
            record,
        })
    }
}
