/// 缓存操作
/// 提供基于 Store 的缓存操作实现

// 限流计数
pub mod rate_limit;

// 数据记录缓存
pub mod record;

pub use rate_limit::RateLimitCacheOperations;
pub use record::RecordCacheOperations;
