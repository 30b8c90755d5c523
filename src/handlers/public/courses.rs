use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::{Course, WithOwner};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/courses - every course with its owner
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<WithOwner<Course>>> {
    Ok(ApiResponse::success(state.courses.list().await?))
}

/// GET /api/courses/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<WithOwner<Course>> {
    Ok(ApiResponse::success(state.courses.get(id).await?))
}
