// 缓存模块
// 包含键生成和基于 Store 的缓存操作

pub mod keys;
pub mod operations;

pub use operations::{RateLimitCacheOperations, RecordCacheOperations};
