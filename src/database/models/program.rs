use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::{Owned, Visible};

/// A training program assembled by a coach. Private programs are only
/// visible to their author.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub is_private: bool,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Program {
    const KIND: &'static str = "program";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Visible for Program {
    fn is_private(&self) -> bool {
        self.is_private
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramInput {
    pub title: Option<String>,
    pub is_private: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProgram {
    pub title: String,
    pub is_private: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramChanges {
    pub title: Option<String>,
    pub is_private: Option<bool>,
    pub description: Option<String>,
}
