//! 存储抽象
//!
//! 限流计数、数据缓存和通知发布都只依赖 [`Store`] 提供的原语：
//! 原子自增、过期、带 TTL 的读写以及发布/订阅。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

pub mod memory;
pub mod redis_impl;

pub use memory::MemoryStore;
pub use redis_impl::RedisStore;

/// 使用进程内存储的连接地址
pub const MEMORY_URL: &str = "memory://";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),
    #[error("store operation failed: {0}")]
    Operation(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// 频道上收到的一条消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: String,
    pub payload: String,
}

/// 订阅产生的消息流，连接断开后结束且不可重启
pub type NotificationStream = BoxStream<'static, Notification>;

#[async_trait]
pub trait Store: Send + Sync {
    /// 自增并返回自增后的值，键不存在时从 0 开始
    async fn incr(&self, key: &str) -> Result<i64>;

    /// 为已存在的键设置过期时间
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// 写入并覆盖旧值，同时设置过期时间
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// 发布消息，返回收到消息的订阅者数量
    async fn publish(&self, channel: &str, payload: &str) -> Result<usize>;

    async fn subscribe(&self, channel: &str) -> Result<NotificationStream>;
}

/// 根据地址建立存储连接，`memory://` 使用进程内实现
pub async fn connect(url: &str) -> Result<Arc<dyn Store>> {
    if url.starts_with(MEMORY_URL) {
        tracing::warn!("Using in-process memory store, state is not shared between processes");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = RedisStore::connect(url).await?;
    Ok(Arc::new(store))
}
