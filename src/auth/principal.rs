use serde::Serialize;

use super::role_set::RoleSet;
use crate::database::models::User;

/// The authenticated actor of one request. Built from a user record after a
/// successful credential check and dropped with the request.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    #[serde(flatten)]
    user: User,
    #[serde(skip)]
    roles: RoleSet,
}

impl Principal {
    pub fn new(user: User) -> Self {
        let roles = user.role_set();
        Self { user, roles }
    }

    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn identity(&self) -> &str {
        &self.user.email_address
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn rank(&self) -> u16 {
        self.roles.highest_rank()
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

#[cfg(test)]
pub(crate) fn test_principal(id: i64, roles: &str) -> Principal {
    let now = chrono::Utc::now();
    Principal::new(User {
        id,
        roles: roles.to_string(),
        first_name: "Test".into(),
        last_name: format!("User{}", id),
        email_address: format!("user{}@example.com", id),
        password: String::new(),
        date_of_birth: None,
        biological_sex: None,
        phone: None,
        city: None,
        biography: None,
        avatar_url: None,
        created_at: now,
        updated_at: now,
    })
}
