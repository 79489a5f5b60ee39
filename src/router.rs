use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    middleware::{RateLimiter, log_errors, rate_limit},
    routes,
};

pub fn app(state: AppState, rate_limiter: Arc<RateLimiter>) -> Router {
    let router = Router::new()
        .route("/data/{id}", get(routes::data::get_data))
        .route("/notify", post(routes::notify::notify))
        // 外层先记录错误，限流在最内层
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(log_errors))
                .layer(axum::middleware::from_fn_with_state(rate_limiter, rate_limit)),
        );

    // 开发模式允许所有来源
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}
