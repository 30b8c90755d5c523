use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::auth::Principal;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::UserUpdateRequest;

/// GET /api/users - the authenticated user
pub async fn whoami(Extension(principal): Extension<Principal>) -> ApiResult<Principal> {
    Ok(ApiResponse::success(principal))
}

/// PUT /api/users/:id
///
/// Editing your own account changes profile fields only. Editing anyone
/// else's account changes roles only, through `promote` and `demote`.
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UserUpdateRequest>,
) -> ApiResult<()> {
    if principal.id() == id {
        state.users.update_own_profile(&principal, body.profile).await?;
    } else {
        state
            .users
            .update_user_roles(&principal, id, body.promote.as_deref(), body.demote.as_deref())
            .await?;
    }
    Ok(ApiResponse::no_content())
}
