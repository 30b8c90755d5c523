use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::{Course, CourseChanges, CourseInput};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};

/// POST /api/courses - the caller becomes the owner
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<CourseInput>,
) -> ApiResult<Course> {
    let course = state.courses.create(&principal, body).await?;
    let location = format!("/api/courses/{}", course.id);
    Ok(ApiResponse::created(course, location))
}

/// PUT /api/courses/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<CourseChanges>,
) -> ApiResult<()> {
    state.courses.update(&principal, id, body).await?;
    Ok(ApiResponse::no_content())
}

/// DELETE /api/courses/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state.courses.delete(&principal, id).await?;
    Ok(ApiResponse::no_content())
}
