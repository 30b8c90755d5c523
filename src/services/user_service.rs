use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use super::validation::{
    age_on, is_email, optional_text, parse_date, required_text, ValidationErrors,
};
use super::ServiceError;
use crate::auth::{
    compute_new_roles, require_rank, Denied, Operation, Passwords, Principal, RoleSet,
};
use crate::config::SchoolConfig;
use crate::database::models::{NewUser, ProfileChanges, User};
use crate::database::Store;

/// Body of `POST /api/users`. Any `roles` key is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub password: Option<String>,
    pub date_of_birth: Option<String>,
    pub biological_sex: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub biography: Option<String>,
    pub avatar_url: Option<String>,
}

/// Profile fields a user may change on their own account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub password: Option<String>,
    pub date_of_birth: Option<String>,
    pub biological_sex: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub biography: Option<String>,
    pub avatar_url: Option<String>,
}

/// Body of `PUT /api/users/:id`. Which half applies depends on whether the
/// principal edits their own account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    #[serde(flatten)]
    pub profile: ProfileRequest,
    pub promote: Option<String>,
    pub demote: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    passwords: Passwords,
    rules: SchoolConfig,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, passwords: Passwords, rules: SchoolConfig) -> Self {
        Self { store, passwords, rules }
    }

    /// Creates an account. New accounts never hold roles.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, ServiceError> {
        let mut errors = ValidationErrors::new();
        let today = Utc::now().date_naive();

        let first_name = required_text(
            request.first_name,
            "A first name is required",
            "Please provide a first name",
            &mut errors,
        );
        let last_name = required_text(
            request.last_name,
            "A last name is required",
            "Please provide a last name",
            &mut errors,
        );
        let email_address = required_text(
            request.email_address,
            "An email address is required",
            "Please provide an email address",
            &mut errors,
        );
        if let Some(email) = &email_address {
            if !is_email(email) {
                errors.push("Please provide a valid email address");
            }
        }
        let password = self.check_password(request.password, true, &mut errors);
        let date_of_birth = match request.date_of_birth {
            None => {
                errors.push("A date of birth is required");
                None
            }
            Some(raw) => self.check_birth_date(&raw, today, &mut errors),
        };
        let biography = self.check_biography(request.biography, &mut errors);

        let (first_name, last_name, email_address, password) =
            match (first_name, last_name, email_address, password) {
                (Some(f), Some(l), Some(e), Some(p)) if errors.is_empty() => (f, l, e, p),
                _ => return Err(errors.into()),
            };

        let password_hash = self.hash(password).await?;
        let user = self
            .store
            .create_user(NewUser {
                first_name,
                last_name,
                email_address,
                password_hash,
                date_of_birth,
                biological_sex: request.biological_sex,
                phone: request.phone,
                city: request.city,
                biography,
                avatar_url: request.avatar_url,
            })
            .await?;

        info!("Registered user {} ({})", user.id, user.email_address);
        Ok(user)
    }

    /// Self-service edit. Roles cannot change through this path.
    pub async fn update_own_profile(
        &self,
        principal: &Principal,
        request: ProfileRequest,
    ) -> Result<User, ServiceError> {
        let mut errors = ValidationErrors::new();
        let today = Utc::now().date_naive();

        let first_name =
            optional_text(request.first_name, "Please provide a first name", &mut errors);
        let last_name = optional_text(request.last_name, "Please provide a last name", &mut errors);
        let email_address = optional_text(
            request.email_address,
            "Please provide an email address",
            &mut errors,
        );
        if let Some(email) = &email_address {
            if !is_email(email) {
                errors.push("Please provide a valid email address");
            }
        }
        let password = self.check_password(request.password, false, &mut errors);
        let date_of_birth = request
            .date_of_birth
            .and_then(|raw| self.check_birth_date(&raw, today, &mut errors));
        let biography = self.check_biography(request.biography, &mut errors);
        errors.finish(())?;

        let password_hash = match password {
            Some(p) => Some(self.hash(p).await?),
            None => None,
        };

        let changes = ProfileChanges {
            first_name,
            last_name,
            email_address,
            password_hash,
            date_of_birth,
            biological_sex: request.biological_sex,
            phone: request.phone,
            city: request.city,
            biography,
            avatar_url: request.avatar_url,
        };

        if changes.is_empty() {
            return Ok(principal.user().clone());
        }
        let user = self.store.update_user_profile(principal.id(), changes).await?;
        info!("User {} updated own profile", user.id);
        Ok(user)
    }

    /// Promotes and demotes another user's roles, within the actor's rank.
    pub async fn update_user_roles(
        &self,
        principal: &Principal,
        target_id: i64,
        promote: Option<&str>,
        demote: Option<&str>,
    ) -> Result<User, ServiceError> {
        let target = self
            .store
            .find_user_by_id(target_id)
            .await?
            .ok_or(Denied::ResourceAbsent { kind: "user" })?;

        require_rank(principal, Operation::MutateUserRoles)?;

        let current = target.role_set();
        let updated = compute_new_roles(
            &current,
            principal.rank(),
            &RoleSet::decode(promote.unwrap_or_default()),
            &RoleSet::decode(demote.unwrap_or_default()),
        );

        let encoded = updated.encode();
        if encoded == target.roles {
            return Ok(target);
        }

        let user = self.store.update_user_roles(target.id, &encoded).await?;
        info!(
            "User {} changed roles of user {}: '{}' -> '{}'",
            principal.id(),
            user.id,
            target.roles,
            user.roles
        );
        Ok(user)
    }

    fn check_password(
        &self,
        password: Option<String>,
        required: bool,
        errors: &mut ValidationErrors,
    ) -> Option<String> {
        let message = format!(
            "A password between {} and {} characters in length is required",
            self.rules.password_min_len, self.rules.password_max_len
        );
        match password {
            None if required => {
                errors.push(message);
                None
            }
            None => None,
            Some(p) => {
                let len = p.chars().count();
                if len < self.rules.password_min_len || len > self.rules.password_max_len {
                    errors.push(message);
                    None
                } else {
                    Some(p)
                }
            }
        }
    }

    fn check_birth_date(
        &self,
        raw: &str,
        today: NaiveDate,
        errors: &mut ValidationErrors,
    ) -> Option<NaiveDate> {
        let Some(born) = parse_date(raw) else {
            errors.push(
                "'dateOfBirth' should be a valid date in YYYY-MM-DD format, e. g. '1989-05-26'",
            );
            return None;
        };
        if age_on(born, today) < self.rules.minimum_age as i32 {
            errors.push(format!(
                "User is too young to participate, the minimum age is {}",
                self.rules.minimum_age
            ));
            return None;
        }
        Some(born)
    }

    fn check_biography(
        &self,
        biography: Option<String>,
        errors: &mut ValidationErrors,
    ) -> Option<String> {
        match biography {
            Some(bio) if bio.chars().count() > self.rules.biography_max_len => {
                errors.push(format!(
                    "The biography may be at most {} characters long",
                    self.rules.biography_max_len
                ));
                None
            }
            other => other,
        }
    }

    async fn hash(&self, password: String) -> Result<String, ServiceError> {
        let passwords = self.passwords.clone();
        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?
            .map_err(ServiceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{password, Principal};
    use crate::database::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> UserService {
        UserService::new(store, password::fast(), SchoolConfig::default())
    }

    fn seed(email: &str) -> NewUser {
        NewUser {
            first_name: "Seed".into(),
            last_name: "User".into(),
            email_address: email.into(),
            password_hash: "not-a-hash".into(),
            date_of_birth: None,
            biological_sex: None,
            phone: None,
            city: None,
            biography: None,
            avatar_url: None,
        }
    }

    fn registration() -> RegisterRequest {
        RegisterRequest {
            first_name: Some("Joe".into()),
            last_name: Some("Smith".into()),
            email_address: Some("joe@example.com".into()),
            password: Some("joepassword".into()),
            date_of_birth: Some("1990-04-12".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn registration_hashes_and_starts_without_roles() {
        let store = Arc::new(MemoryStore::new());
        let user = service(store.clone()).register(registration()).await.unwrap();
        assert_eq!(user.roles, "");
        assert_ne!(user.password, "joepassword");
        assert!(password::fast().verify("joepassword", &user.password));
    }

    #[tokio::test]
    async fn registration_collects_every_problem() {
        let store = Arc::new(MemoryStore::new());
        let err = service(store)
            .register(RegisterRequest {
                password: Some("short".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        let ServiceError::Validation(errors) = err else {
            panic!("expected validation failure, got {:?}", err);
        };
        assert!(errors.messages().contains(&"A first name is required".to_string()));
        assert!(errors.messages().contains(&"A date of birth is required".to_string()));
        assert!(errors
            .messages()
            .contains(&"A password between 8 and 20 characters in length is required".to_string()));
    }

    #[tokio::test]
    async fn registration_enforces_minimum_age() {
        let store = Arc::new(MemoryStore::new());
        let this_year = Utc::now().date_naive().format("%Y").to_string();
        let err = service(store)
            .register(RegisterRequest {
                date_of_birth: Some(format!("{}-01-01", this_year)),
                ..registration()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn own_profile_edit_leaves_roles_alone() {
        let store = Arc::new(MemoryStore::new());
        let user = store.insert_user_with_roles(seed("a@example.com"), "athlete").await.unwrap();
        let principal = Principal::new(user);
        let updated = service(store)
            .update_own_profile(
                &principal,
                ProfileRequest {
                    city: Some("Tallinn".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.city.as_deref(), Some("Tallinn"));
        assert_eq!(updated.roles, "athlete");
    }

    #[tokio::test]
    async fn coach_promotes_below_own_rank_only() {
        let store = Arc::new(MemoryStore::new());
        let coach = store.insert_user_with_roles(seed("coach@example.com"), "coach").await.unwrap();
        let target = store.create_user(seed("t@example.com")).await.unwrap();
        let principal = Principal::new(coach);

        let updated = service(store)
            .update_user_roles(&principal, target.id, Some("athlete admin"), None)
            .await
            .unwrap();
        assert_eq!(updated.roles, "athlete");
    }

    #[tokio::test]
    async fn athletes_cannot_touch_roles() {
        let store = Arc::new(MemoryStore::new());
        let athlete = store.insert_user_with_roles(seed("a@example.com"), "athlete").await.unwrap();
        let target = store.create_user(seed("t@example.com")).await.unwrap();
        let err = service(store)
            .update_user_roles(&Principal::new(athlete), target.id, Some("user"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Denied(Denied::InsufficientRank { .. })));
    }

    #[tokio::test]
    async fn missing_target_is_reported_before_rank() {
        let store = Arc::new(MemoryStore::new());
        let err = service(store)
            .update_user_roles(&crate::auth::principal::test_principal(1, ""), 99, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Denied(Denied::ResourceAbsent { kind: "user" })));
    }
}
