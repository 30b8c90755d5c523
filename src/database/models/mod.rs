pub mod course;
pub mod program;
pub mod user;

pub use course::{Course, CourseChanges, CourseInput, NewCourse};
pub use program::{Program, NewProgram, ProgramChanges, ProgramInput};
pub use user::{NewUser, ProfileChanges, User, UserSummary};

use serde::Serialize;

/// A course or program as returned to clients, with its author attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithOwner<T> {
    #[serde(flatten)]
    pub item: T,
    pub owner: Option<UserSummary>,
}
