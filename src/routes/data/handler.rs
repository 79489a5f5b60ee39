use axum::extract::{Json, Path, State};

use crate::AppState;
use crate::error::AppError;
use crate::fetcher::Fetched;

/// id 不做校验，原样作为缓存键和数据源参数
#[axum::debug_handler]
pub async fn get_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Fetched>, AppError> {
    let fetched = state.fetcher.fetch(&id).await?;
    Ok(Json(fetched))
}
