use std::time::Duration;

use axum::Json;
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::source::FetchError;
use crate::store::StoreError;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Try again later.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::RateLimited { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_MESSAGE.to_string())
            }
            AppError::InvalidBody(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            // 存储故障与上游故障对外不做区分
            AppError::Store(_) | AppError::Fetch(_) => {
                tracing::error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        let mut response = (status, Json(ErrorResponse { error })).into_response();

        if let AppError::RateLimited { retry_after } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
