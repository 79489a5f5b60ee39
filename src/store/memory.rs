//! 进程内存储实现
//!
//! 行为与 Redis 对齐：INCR 保留已有的过期时间，过期键在访问时惰性清除，
//! 发布时没有订阅者则消息直接丢弃。过期时间基于 `tokio::time::Instant`，
//! 测试中可以用暂停的时钟推进窗口。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use tokio::sync::{Mutex, broadcast};
use tokio::time::Instant;

use super::{Notification, NotificationStream, Result, Store, StoreError};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<String>>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟存储不可达，之后所有操作返回连接错误
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("memory store is unavailable".into()));
        }
        Ok(())
    }

    /// 剩余存活时间，键不存在或没有过期时间时返回 None
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().await;
        let now = Instant::now();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.expires_at)
            .map(|exp| exp.saturating_duration_since(now))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn incr(&self, key: &str) -> Result<i64> {
        self.check_available()?;
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let current = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.clone()),
            _ => None,
        };

        let (count, expires_at) = match current {
            Some(entry) => {
                let value: i64 = entry.value.parse().map_err(|_| {
                    StoreError::Operation("value is not an integer or out of range".into())
                })?;
                (value + 1, entry.expires_at)
            }
            None => (1, None),
        };

        entries.insert(
            key.to_string(),
            Entry {
                value: count.to_string(),
                expires_at,
            },
        );
        Ok(count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = Some(now + ttl);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<usize> {
        self.check_available()?;
        let channels = self.channels.lock().await;
        let receivers = channels
            .get(channel)
            .and_then(|tx| tx.send(payload.to_string()).ok())
            .unwrap_or(0);
        Ok(receivers)
    }

    async fn subscribe(&self, channel: &str) -> Result<NotificationStream> {
        self.check_available()?;
        let rx = {
            let mut channels = self.channels.lock().await;
            channels
                .entry(channel.to_string())
                .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
                .subscribe()
        };

        let channel = channel.to_string();
        let events = stream::unfold((rx, channel), |(mut rx, channel)| async move {
            loop {
                match rx.recv().await {
                    Ok(payload) => {
                        let event = Notification {
                            channel: channel.clone(),
                            payload,
                        };
                        return Some((event, (rx, channel)));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Subscriber on {} lagged, {} messages lost", channel, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(events.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn incr_keeps_existing_expiry() {
        let store = MemoryStore::new();

        assert_eq!(store.incr("k").await.unwrap(), 1);
        store.expire("k", Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(store.incr("k").await.unwrap(), 2);
        assert_eq!(store.ttl("k").await, Some(Duration::from_secs(30)));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(store.incr("k").await.unwrap(), 1);
        assert_eq!(store.ttl("k").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn set_ex_entries_expire() {
        let store = MemoryStore::new();
        store.set_ex("k", "v", Duration::from_secs(10)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn incr_on_text_value_fails() {
        let store = MemoryStore::new();
        store.set_ex("k", "text", Duration::from_secs(10)).await.unwrap();
        assert!(matches!(
            store.incr("k").await,
            Err(StoreError::Operation(_))
        ));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_dropped() {
        let store = MemoryStore::new();
        assert_eq!(store.publish("notifications", "lost").await.unwrap(), 0);

        let mut events = store.subscribe("notifications").await.unwrap();
        assert_eq!(store.publish("notifications", "hello").await.unwrap(), 1);
        assert_eq!(
            events.next().await,
            Some(Notification {
                channel: "notifications".into(),
                payload: "hello".into(),
            })
        );
    }

    #[tokio::test]
    async fn unavailable_store_rejects_operations() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(matches!(store.incr("k").await, Err(StoreError::Connection(_))));
        assert!(matches!(store.get("k").await, Err(StoreError::Connection(_))));
        assert!(store.subscribe("c").await.is_err());

        store.set_available(true);
        assert_eq!(store.incr("k").await.unwrap(), 1);
    }
}
