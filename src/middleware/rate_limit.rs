use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{cache::RateLimitCacheOperations, config::Config, error::AppError, store::Store};

/// 无法识别客户端时使用的标识
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn Store>,
    config: Arc<Config>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// 识别客户端：默认使用连接的对端地址，信任代理时优先使用代理头
    pub fn client_id(&self, req: &Request<Body>) -> String {
        let remote_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string());

        let forwarded = if self.config.trust_proxy {
            req.headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .filter(|ip| !ip.trim().is_empty())
                .or_else(|| {
                    req.headers()
                        .get("x-forwarded-for")
                        .and_then(|h| h.to_str().ok())
                        .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
                })
        } else {
            None
        };

        forwarded
            .or(remote_ip.as_deref())
            .unwrap_or(UNKNOWN_CLIENT)
            .trim()
            .to_string()
    }

    /// 计数一次请求，超过阈值时返回限流错误
    pub async fn check(&self, client: &str) -> Result<i64, AppError> {
        let window = self.config.rate_limit_window();
        let count = RateLimitCacheOperations::hit(self.store.as_ref(), client, window).await?;

        if count > i64::from(self.config.rate_limit_requests) {
            tracing::warn!("Rate limit exceeded for {} ({} requests)", client, count);
            return Err(AppError::RateLimited {
                retry_after: window,
            });
        }

        Ok(count)
    }

    pub async fn check_rate_limit(
        self: Arc<Self>,
        req: Request<Body>,
        next: Next,
    ) -> Result<Response, AppError> {
        let client = self.client_id(&req);
        let count = self.check(&client).await?;
        tracing::debug!("Request {} in current window for {}", count, client);

        Ok(next.run(req).await)
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    limiter.check_rate_limit(req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn limiter(trust_proxy: bool) -> RateLimiter {
        let config = Config {
            trust_proxy,
            ..Config::default()
        };
        RateLimiter::new(Arc::new(MemoryStore::new()), config)
    }

    fn request_from(addr: &str) -> Request<Body> {
        let mut req = Request::builder()
            .uri("/data/1")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        let addr: SocketAddr = addr.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[test]
    fn uses_peer_address_by_default() {
        let req = request_from("192.0.2.1:5000");
        assert_eq!(limiter(false).client_id(&req), "192.0.2.1");
    }

    #[test]
    fn prefers_forwarded_headers_when_trusted() {
        let req = request_from("192.0.2.1:5000");
        assert_eq!(limiter(true).client_id(&req), "203.0.113.9");
    }

    #[test]
    fn unknown_without_connect_info() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(limiter(false).client_id(&req), UNKNOWN_CLIENT);
    }

    #[tokio::test]
    async fn sixth_request_is_rejected() {
        let limiter = limiter(false);
        for expected in 1..=5 {
            assert_eq!(limiter.check("192.0.2.1").await.unwrap(), expected);
        }
        assert!(matches!(
            limiter.check("192.0.2.1").await,
            Err(AppError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn store_failure_fails_closed() {
        let store = MemoryStore::new();
        store.set_available(false);
        let limiter = RateLimiter::new(Arc::new(store), Config::default());

        assert!(matches!(
            limiter.check("192.0.2.1").await,
            Err(AppError::Store(_))
        ));
    }
}
