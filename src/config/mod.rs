use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub cache_ttl_secs: u64,
    pub fetch_latency_ms: u64,
    pub notify_channel: String,
    /// 是否信任 X-Real-IP / X-Forwarded-For
    pub trust_proxy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".into(),
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            rate_limit_window_secs: 60,
            rate_limit_requests: 5,
            cache_ttl_secs: 60,
            fetch_latency_ms: 2000,
            notify_channel: "notifications".into(),
            trust_proxy: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构建配置，未设置的项使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Ok(Config {
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse(&lookup, "SERVER_PORT", defaults.server_port)?,
            rate_limit_window_secs: parse(
                &lookup,
                "RATE_LIMIT_WINDOW",
                defaults.rate_limit_window_secs,
            )?,
            rate_limit_requests: parse(&lookup, "RATE_LIMIT_REQUESTS", defaults.rate_limit_requests)?,
            cache_ttl_secs: parse(&lookup, "CACHE_TTL", defaults.cache_ttl_secs)?,
            fetch_latency_ms: parse(&lookup, "FETCH_LATENCY_MS", defaults.fetch_latency_ms)?,
            notify_channel: lookup("NOTIFY_CHANNEL").unwrap_or(defaults.notify_channel),
            trust_proxy: parse(&lookup, "TRUST_PROXY", defaults.trust_proxy)?,
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
