use serde::{Deserialize, Serialize};

/// Rank of a principal holding no valid role at all.
pub const RANK_NONE: u16 = 0;

/// Named privilege levels, declared in ascending rank order so the derived
/// `Ord` matches the rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Athlete,
    Coach,
    Admin,
    Superadmin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::User,
        Role::Athlete,
        Role::Coach,
        Role::Admin,
        Role::Superadmin,
    ];

    pub const fn rank(self) -> u16 {
        match self {
            Role::User => 100,
            Role::Athlete => 200,
            Role::Coach => 300,
            Role::Admin => 400,
            Role::Superadmin => 500,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Athlete => "athlete",
            Role::Coach => "coach",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    /// Exact, lowercase lookup. Callers that accept free-form input lowercase first.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "user" => Some(Role::User),
            "athlete" => Some(Role::Athlete),
            "coach" => Some(Role::Coach),
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }

    pub fn from_rank(rank: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.rank() == rank)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum rank an operation demands, expressed against a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "role")]
pub enum RankRequirement {
    /// rank >= role
    AtLeast(Role),
    /// rank > role
    Above(Role),
}

impl RankRequirement {
    pub const fn is_met(self, rank: u16) -> bool {
        match self {
            RankRequirement::AtLeast(role) => rank >= role.rank(),
            RankRequirement::Above(role) => rank > role.rank(),
        }
    }
}

/// Rank for a valid role name, `RANK_NONE` for anything else.
pub fn rank_of(name: &str) -> u16 {
    Role::from_name(name).map(Role::rank).unwrap_or(RANK_NONE)
}

/// Inverse of [`rank_of`] for the five canonical ranks only.
pub fn name_of(rank: u16) -> Option<&'static str> {
    Role::from_rank(rank).map(Role::as_str)
}
