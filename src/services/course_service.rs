use std::sync::Arc;

use tracing::info;

use super::validation::{optional_text, required_text, ValidationErrors};
use super::{attach_owner, attach_owners, ServiceError};
use crate::auth::{require_ownership, Denied, Principal};
use crate::database::models::{Course, CourseChanges, CourseInput, NewCourse, WithOwner};
use crate::database::Store;

/// Course catalogue. Reading is public; changes are reserved to the course
/// creator, whatever their rank.
#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn Store>,
}

impl CourseService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<WithOwner<Course>>, ServiceError> {
        let courses = self.store.list_courses().await?;
        Ok(attach_owners(self.store.as_ref(), courses).await?)
    }

    pub async fn get(&self, id: i64) -> Result<WithOwner<Course>, ServiceError> {
        let course = self.fetch(id).await?;
        Ok(attach_owner(self.store.as_ref(), course).await?)
    }

    async fn fetch(&self, id: i64) -> Result<Course, ServiceError> {
        self.store
            .find_course(id)
            .await?
            .ok_or_else(|| Denied::ResourceAbsent { kind: "course" }.into())
    }

    pub async fn create(
        &self,
        principal: &Principal,
        input: CourseInput,
    ) -> Result<Course, ServiceError> {
        let course = validate_new_course(input)?;
        let created = self.store.create_course(principal.id(), course).await?;
        info!("User {} created course {}", principal.id(), created.id);
        Ok(created)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        changes: CourseChanges,
    ) -> Result<Course, ServiceError> {
        let existing = self.fetch(id).await?;
        require_ownership(principal, &existing)?;
        let changes = validate_course_changes(changes)?;
        Ok(self.store.update_course(id, changes).await?)
    }

    pub async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError> {
        let existing = self.fetch(id).await?;
        require_ownership(principal, &existing)?;
        self.store.delete_course(id).await?;
        info!("User {} deleted course {}", principal.id(), id);
        Ok(())
    }
}

fn validate_new_course(input: CourseInput) -> Result<NewCourse, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let title = required_text(
        input.title,
        "A title is required",
        "Please provide a title",
        &mut errors,
    );
    let description = required_text(
        input.description,
        "A description is required",
        "Please provide a description",
        &mut errors,
    );
    match (title, description) {
        (Some(title), Some(description)) => Ok(NewCourse {
            title,
            description,
            estimated_time: input.estimated_time,
            materials_needed: input.materials_needed,
        }),
        _ => Err(errors),
    }
}

fn validate_course_changes(changes: CourseChanges) -> Result<CourseChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let title = optional_text(changes.title, "Please provide a title", &mut errors);
    let description =
        optional_text(changes.description, "Please provide a description", &mut errors);
    errors.finish(CourseChanges {
        title,
        description,
        ..changes
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_course_needs_title_and_description() {
        let err = validate_new_course(CourseInput::default()).unwrap_err();
        assert_eq!(err.messages(), ["A title is required", "A description is required"]);

        let ok = validate_new_course(CourseInput {
            title: Some("Sun salutation".into()),
            description: Some("Twelve poses".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ok.title, "Sun salutation");
    }

    #[test]
    fn changes_may_not_blank_required_fields() {
        let err = validate_course_changes(CourseChanges {
            title: Some(" ".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.messages(), ["Please provide a title"]);
        assert!(validate_course_changes(CourseChanges::default()).is_ok());
    }
}
