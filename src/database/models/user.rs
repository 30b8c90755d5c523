use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::RoleSet;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Canonical role string as persisted, e.g. "athlete coach".
    pub roles: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub date_of_birth: Option<NaiveDate>,
    pub biological_sex: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub biography: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role_set(&self) -> RoleSet {
        RoleSet::decode(&self.roles)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email_address: self.email_address.clone(),
        }
    }
}

/// Owner details embedded in course and program responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

/// Insert payload. Roles are not part of it: new accounts always start empty.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password_hash: String,
    pub date_of_birth: Option<NaiveDate>,
    pub biological_sex: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub biography: Option<String>,
    pub avatar_url: Option<String>,
}

/// Self-service profile edit. `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub password_hash: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub biological_sex: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub biography: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email_address.is_none()
            && self.password_hash.is_none()
            && self.date_of_birth.is_none()
            && self.biological_sex.is_none()
            && self.phone.is_none()
            && self.city.is_none()
            && self.biography.is_none()
            && self.avatar_url.is_none()
    }
}
