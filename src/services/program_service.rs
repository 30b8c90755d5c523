use std::sync::Arc;

use tracing::info;

use super::validation::{optional_text, required_text, ValidationErrors};
use super::{attach_owner, attach_owners, ServiceError};
use crate::auth::{
    require_ownership, require_rank, require_visible, visible_resources, Denied, Operation,
    Principal,
};
use crate::database::models::{NewProgram, Program, ProgramChanges, ProgramInput, WithOwner};
use crate::database::Store;

/// Training programs. Athletes and above may read public programs and their
/// own private ones; coaches and above may author them.
#[derive(Clone)]
pub struct ProgramService {
    store: Arc<dyn Store>,
}

impl ProgramService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_visible(
        &self,
        principal: &Principal,
    ) -> Result<Vec<WithOwner<Program>>, ServiceError> {
        require_rank(principal, Operation::ViewPrograms)?;
        let programs = visible_resources(principal, self.store.list_programs().await?);
        Ok(attach_owners(self.store.as_ref(), programs).await?)
    }

    pub async fn get_visible(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<WithOwner<Program>, ServiceError> {
        require_rank(principal, Operation::ViewPrograms)?;
        let program = require_visible(principal, self.store.find_program(id).await?)?;
        Ok(attach_owner(self.store.as_ref(), program).await?)
    }

    pub async fn create(
        &self,
        principal: &Principal,
        input: ProgramInput,
    ) -> Result<Program, ServiceError> {
        require_rank(principal, Operation::CreateProgram)?;
        let program = validate_new_program(input)?;
        let created = self.store.create_program(principal.id(), program).await?;
        info!("User {} created program {}", principal.id(), created.id);
        Ok(created)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        changes: ProgramChanges,
    ) -> Result<Program, ServiceError> {
        require_rank(principal, Operation::EditProgram)?;
        let existing = self
            .store
            .find_program(id)
            .await?
            .ok_or(Denied::ResourceAbsent { kind: "program" })?;
        require_ownership(principal, &existing)?;
        let changes = validate_program_changes(changes)?;
        Ok(self.store.update_program(id, changes).await?)
    }
}

fn validate_new_program(input: ProgramInput) -> Result<NewProgram, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let title = required_text(
        input.title,
        "A title is required",
        "Please provide a title",
        &mut errors,
    );
    if input.is_private.is_none() {
        errors.push("It must be stated whether the training program is private or not");
    }
    let description = required_text(
        input.description,
        "A description is required",
        "Please provide a description",
        &mut errors,
    );
    match (title, input.is_private, description) {
        (Some(title), Some(is_private), Some(description)) => Ok(NewProgram {
            title,
            is_private,
            description,
        }),
        _ => Err(errors),
    }
}

fn validate_program_changes(changes: ProgramChanges) -> Result<ProgramChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let title = optional_text(changes.title, "Please provide a title", &mut errors);
    let description =
        optional_text(changes.description, "Please provide a description", &mut errors);
    errors.finish(ProgramChanges {
        title,
        description,
        is_private: changes.is_private,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privacy_flag_is_mandatory() {
        let err = validate_new_program(ProgramInput {
            title: Some("Competition six".into()),
            description: Some("Balanced set".into()),
            is_private: None,
        })
        .unwrap_err();
        assert_eq!(
            err.messages(),
            ["It must be stated whether the training program is private or not"]
        );
    }

    #[test]
    fn complete_program_validates() {
        let program = validate_new_program(ProgramInput {
            title: Some("Competition six".into()),
            description: Some("Balanced set".into()),
            is_private: Some(true),
        })
        .unwrap();
        assert!(program.is_private);
    }
}
