use axum::extract::State;

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::RegisterRequest;

/// POST /api/users - register a new account
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<User> {
    let user = state.users.register(body).await?;
    Ok(ApiResponse::created(user, "/"))
}
