use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::{Program, ProgramChanges, ProgramInput, WithOwner};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};

/// GET /api/programs - public programs plus the caller's private ones
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<WithOwner<Program>>> {
    Ok(ApiResponse::success(state.programs.list_visible(&principal).await?))
}

/// GET /api/programs/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<WithOwner<Program>> {
    Ok(ApiResponse::success(state.programs.get_visible(&principal, id).await?))
}

/// POST /api/programs
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<ProgramInput>,
) -> ApiResult<Program> {
    let program = state.programs.create(&principal, body).await?;
    let location = format!("/api/programs/{}", program.id);
    Ok(ApiResponse::created(program, location))
}

/// PUT /api/programs/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<ProgramChanges>,
) -> ApiResult<()> {
    state.programs.update(&principal, id, body).await?;
    Ok(ApiResponse::no_content())
}
