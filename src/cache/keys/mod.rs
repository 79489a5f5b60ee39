/// 限流计数键前缀
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

/// 数据缓存键前缀
const DATA_PREFIX: &str = "data:";

/// 生成客户端限流计数键
pub fn rate_limit_key(client: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, client)
}

/// 生成数据缓存键
pub fn data_key(id: &str) -> String {
    format!("{}{}", DATA_PREFIX, id)
}
