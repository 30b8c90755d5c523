pub mod course_service;
pub mod program_service;
pub mod user_service;
pub mod validation;

pub use course_service::CourseService;
pub use program_service::ProgramService;
pub use user_service::{ProfileRequest, RegisterRequest, UserService, UserUpdateRequest};
pub use validation::ValidationErrors;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::auth::{Denied, Owned, PasswordError};
use crate::database::models::{UserSummary, WithOwner};
use crate::database::{Store, StoreError};
use crate::error::ApiError;

/// Failure of a service operation. Each kind keeps its own HTTP mapping.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Denied(#[from] Denied),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => errors.into(),
            ServiceError::Denied(denied) => denied.into(),
            ServiceError::Store(store) => store.into(),
            ServiceError::Password(password) => password.into(),
            ServiceError::Internal(msg) => {
                tracing::error!("Internal service error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

/// Attaches author summaries, looking each distinct owner up once. An owner
/// whose account no longer exists is reported as `None`.
pub(crate) async fn attach_owners<T: Owned>(
    store: &dyn Store,
    items: Vec<T>,
) -> Result<Vec<WithOwner<T>>, StoreError> {
    let mut owners: BTreeMap<i64, Option<UserSummary>> = BTreeMap::new();
    for item in &items {
        let id = item.owner_id();
        if !owners.contains_key(&id) {
            let summary = store.find_user_by_id(id).await?.map(|u| u.summary());
            owners.insert(id, summary);
        }
    }
    Ok(items
        .into_iter()
        .map(|item| {
            let owner = owners.get(&item.owner_id()).cloned().flatten();
            WithOwner { item, owner }
        })
        .collect())
}

pub(crate) async fn attach_owner<T: Owned>(
    store: &dyn Store,
    item: T,
) -> Result<WithOwner<T>, StoreError> {
    let owner = store.find_user_by_id(item.owner_id()).await?.map(|u| u.summary());
    Ok(WithOwner { item, owner })
}
