use async_trait::async_trait;
use thiserror::Error;

use super::models::{
    Course, CourseChanges, NewCourse, NewProgram, NewUser, ProfileChanges, Program,
    ProgramChanges, User,
};

/// Errors from a persistence backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Read access to user records, the only persistence the authentication
/// path needs.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Exact, case-sensitive match on the email address.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait Store: UserLookup {
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Inserts with an empty role string. Fails with `Conflict` on a taken email.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn update_user_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<User, StoreError>;

    /// Overwrites the role column. Last writer wins.
    async fn update_user_roles(&self, id: i64, roles: &str) -> Result<User, StoreError>;

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;

    async fn find_course(&self, id: i64) -> Result<Option<Course>, StoreError>;

    async fn create_course(&self, owner_id: i64, course: NewCourse) -> Result<Course, StoreError>;

    async fn update_course(&self, id: i64, changes: CourseChanges) -> Result<Course, StoreError>;

    async fn delete_course(&self, id: i64) -> Result<(), StoreError>;

    async fn list_programs(&self) -> Result<Vec<Program>, StoreError>;

    async fn find_program(&self, id: i64) -> Result<Option<Program>, StoreError>;

    async fn create_program(
        &self,
        owner_id: i64,
        program: NewProgram,
    ) -> Result<Program, StoreError>;

    async fn update_program(&self, id: i64, changes: ProgramChanges) -> Result<Program, StoreError>;
}

pub(crate) const EMAIL_TAKEN: &str = "The email address you entered already exists";
