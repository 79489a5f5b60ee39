use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use gateway::{
    AppState, config::Config, middleware::RateLimiter, router, shutdown::shutdown_signal,
    source::SimulatedSource, store,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    // 启动时建立存储连接，注入到各组件
    let store = store::connect(&config.redis_url)
        .await
        .expect("Failed to connect to store");

    let source = Arc::new(SimulatedSource::new(config.fetch_latency()));
    let state = AppState::new(config.clone(), store.clone(), source);
    let rate_limiter = Arc::new(RateLimiter::new(store, config.clone()));

    let app = router::app(state, rate_limiter);

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server running at http://{}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    // app 与限流器持有的连接在此之前已随服务器一起释放
    tracing::info!("Server shutdown complete");
}
