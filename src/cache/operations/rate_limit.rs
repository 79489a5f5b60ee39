use std::time::Duration;

use crate::cache::keys;
use crate::store::{Result, Store};

/// 速率限制缓存操作
pub struct RateLimitCacheOperations;

impl RateLimitCacheOperations {
    /// 记录一次请求并返回当前窗口内的请求数
    ///
    /// 只有窗口内的第一个请求会设置过期时间，之后的自增不会延长窗口。
    /// 自增与过期不是原子组合的，过期与下一次自增之间的竞争可能让窗口略有偏差。
    pub async fn hit(store: &dyn Store, client: &str, window: Duration) -> Result<i64> {
        let key = keys::rate_limit_key(client);
        let count = store.incr(&key).await?;

        if count == 1 {
            store.expire(&key, window).await?;
        }

        Ok(count)
    }
}
