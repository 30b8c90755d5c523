use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{authorize, Credentials};
use crate::error::ApiError;

/// HTTP Basic authentication. Resolves the `Authorization` header to a
/// [`Principal`](crate::auth::Principal) and stores it in the request
/// extensions for the handlers behind this layer.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = extract_credentials(&headers);
    let principal = authorize(state.store.as_ref(), &state.passwords, credentials).await?;
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// A missing, non-UTF-8 or non-Basic header all come back as `None`.
fn extract_credentials(headers: &HeaderMap) -> Option<Credentials> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(Credentials::from_basic_header)
}
