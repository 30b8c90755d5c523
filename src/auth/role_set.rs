use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::roles::{Role, RANK_NONE};

/// Canonical, deduplicated, rank-ordered set of roles.
///
/// The storage and wire form is a single ASCII string of lowercase role names
/// separated by one space, lowest rank first. Anything else is decoded
/// leniently: unknown tokens and duplicates are dropped, case is folded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(raw: &str) -> Self {
        Self(
            raw.split_whitespace()
                .filter_map(|token| Role::from_name(&token.to_lowercase()))
                .collect(),
        )
    }

    pub fn encode(&self) -> String {
        self.iter().map(Role::as_str).collect::<Vec<_>>().join(" ")
    }

    /// Rank of the highest held role, `RANK_NONE` when empty.
    pub fn highest_rank(&self) -> u16 {
        self.highest().map(Role::rank).unwrap_or(RANK_NONE)
    }

    pub fn highest(&self) -> Option<Role> {
        self.0.last().copied()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Returns false when the role was already present.
    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn remove(&mut self, role: Role) -> bool {
        self.0.remove(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Ascending rank order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(Role::as_str).collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for RoleSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::decode(s))
    }
}

impl From<String> for RoleSet {
    fn from(raw: String) -> Self {
        Self::decode(&raw)
    }
}

impl From<RoleSet> for String {
    fn from(set: RoleSet) -> Self {
        set.encode()
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Ordered role names for a raw role string.
pub fn decode(raw: &str) -> Vec<&'static str> {
    RoleSet::decode(raw).names()
}

/// Joins role names with single spaces, without re-validating them.
pub fn encode<S: AsRef<str>>(roles: &[S]) -> String {
    roles.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}

pub fn highest_rank(raw: &str) -> u16 {
    RoleSet::decode(raw).highest_rank()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_and_orders_by_rank() {
        assert_eq!(decode("superadmin admin superadmin"), vec!["admin", "superadmin"]);
        assert_eq!(decode("coach athlete user"), vec!["user", "athlete", "coach"]);
    }

    #[test]
    fn drops_invalid_and_blank_tokens() {
        assert_eq!(decode("wizard coach"), vec!["coach"]);
        assert_eq!(decode("   coach    "), vec!["coach"]);
        assert!(decode("wizard warlock").is_empty());
        assert!(decode("").is_empty());
    }

    #[test]
    fn folds_case() {
        assert_eq!(decode("ADMIN Coach"), vec!["coach", "admin"]);
        assert_eq!(RoleSet::decode("SuperAdmin").encode(), "superadmin");
    }

    #[test]
    fn splits_on_any_whitespace() {
        assert_eq!(decode("athlete\tcoach\nadmin"), vec!["athlete", "coach", "admin"]);
    }

    #[test]
    fn highest_rank_of_raw_strings() {
        assert_eq!(highest_rank(""), 0);
        assert_eq!(highest_rank("wizard"), 0);
        assert_eq!(highest_rank("coach athlete"), 300);
        assert_eq!(highest_rank("user"), 100);
        assert_eq!(highest_rank("superadmin athlete"), 500);
    }

    #[test]
    fn encode_joins_with_single_spaces() {
        assert_eq!(encode::<&str>(&[]), "");
        assert_eq!(encode(&["athlete", "coach"]), "athlete coach");
    }

    #[test]
    fn canonicalization_is_a_fixed_point() {
        let inputs = [
            "",
            "  ",
            "admin admin coach",
            "Wizard SUPERADMIN user athlete",
            "coach\tcoach  athlete",
            "athlete coach admin superadmin user",
        ];
        for raw in inputs {
            let once = decode(raw);
            let twice = decode(&encode(&once));
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn serde_uses_canonical_string() {
        let set = RoleSet::decode("coach athlete coach");
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "\"athlete coach\"");
        let back: RoleSet = serde_json::from_str("\"admin wizard Athlete\"").unwrap();
        assert_eq!(back.encode(), "athlete admin");
    }
}
