use std::time::Duration;

use crate::cache::keys;
use crate::source::Record;
use crate::store::{Result, Store, StoreError};

/// 数据记录缓存操作
pub struct RecordCacheOperations;

impl RecordCacheOperations {
    /// 从缓存读取记录，无法解析的缓存值视为存储错误而不是未命中
    pub async fn get_cached_record(store: &dyn Store, id: &str) -> Result<Option<Record>> {
        let key = keys::data_key(id);
        match store.get(&key).await? {
            Some(json) => {
                let record = serde_json::from_str(&json)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// 写入记录并设置过期时间，覆盖已有的值
    pub async fn cache_record(store: &dyn Store, record: &Record, ttl: Duration) -> Result<()> {
        let key = keys::data_key(&record.id);
        let json =
            serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        store.set_ex(&key, &json, ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn record(id: &str) -> Record {
        Record {
            id: id.into(),
            data: format!("Data for ID {}", id),
        }
    }

    #[tokio::test]
    async fn stores_record_as_json() {
        let store = MemoryStore::new();
        RecordCacheOperations::cache_record(&store, &record("42"), Duration::from_secs(60))
            .await
            .unwrap();

        let raw = store.get("data:42").await.unwrap().unwrap();
        assert_eq!(raw, r#"{"id":"42","data":"Data for ID 42"}"#);

        let cached = RecordCacheOperations::get_cached_record(&store, "42")
            .await
            .unwrap();
        assert_eq!(cached, Some(record("42")));
    }

    #[tokio::test]
    async fn miss_returns_none() {
        let store = MemoryStore::new();
        let cached = RecordCacheOperations::get_cached_record(&store, "7")
            .await
            .unwrap();
        assert_eq!(cached, None);
    }

    #[tokio::test]
    async fn corrupt_entry_is_an_error() {
        let store = MemoryStore::new();
        store
            .set_ex("data:42", "not json", Duration::from_secs(60))
            .await
            .unwrap();

        let result = RecordCacheOperations::get_cached_record(&store, "42").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
