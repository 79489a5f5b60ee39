use axum::extract::{Json, State, rejection::JsonRejection};

use super::model::{NotifyRequest, NotifyResponse};
use crate::AppState;
use crate::error::AppError;

#[axum::debug_handler]
pub async fn notify(
    State(state): State<AppState>,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<Json<NotifyResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| AppError::InvalidBody(rejection.body_text()))?;
    let response = req.publish(state.store.as_ref()).await?;
    Ok(Json(response))
}
