//! Role promotion and demotion.
//!
//! An actor may only grant or revoke roles ranked strictly below their own
//! highest role, and only actors above athlete may change roles at all.

use super::gate::ROLE_MUTATION_REQUIREMENT;
use super::role_set::RoleSet;

pub fn can_mutate_roles(actor_rank: u16) -> bool {
    ROLE_MUTATION_REQUIREMENT.is_met(actor_rank)
}

/// Applies promotions, then demotions, to `current`.
///
/// Requests the actor is not entitled to are skipped silently; the function
/// never fails. Below the mutation threshold `current` is returned unchanged.
pub fn compute_new_roles(
    current: &RoleSet,
    actor_rank: u16,
    promote: &RoleSet,
    demote: &RoleSet,
) -> RoleSet {
    let mut roles = current.clone();
    if !can_mutate_roles(actor_rank) {
        return roles;
    }

    for role in promote.iter() {
        if actor_rank > role.rank() {
            roles.insert(role);
        }
    }
    for role in demote.iter() {
        if actor_rank > role.rank() {
            roles.remove(role);
        }
    }
    roles
}

/// String form of [`compute_new_roles`]: raw inputs in, canonical storage string out.
pub fn compute_new_roles_str(
    current: &str,
    actor_rank: u16,
    promote: &str,
    demote: &str,
) -> String {
    compute_new_roles(
        &RoleSet::decode(current),
        actor_rank,
        &RoleSet::decode(promote),
        &RoleSet::decode(demote),
    )
    .encode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_grant_own_rank() {
        assert_eq!(compute_new_roles_str("athlete", 300, "coach", ""), "athlete");
    }

    #[test]
    fn can_grant_strictly_lower_rank() {
        assert_eq!(compute_new_roles_str("athlete", 400, "coach", ""), "athlete coach");
        assert_eq!(compute_new_roles_str("", 300, "athlete", ""), "athlete");
    }

    #[test]
    fn superadmin_demotes_admin() {
        assert_eq!(compute_new_roles_str("coach admin", 500, "", "admin"), "coach");
    }

    #[test]
    fn cannot_demote_peer_or_superior() {
        assert_eq!(compute_new_roles_str("coach admin", 400, "", "admin"), "coach admin");
        assert_eq!(compute_new_roles_str("superadmin", 400, "", "superadmin"), "superadmin");
    }

    #[test]
    fn athlete_and_below_change_nothing() {
        for rank in [0, 100, 200] {
            assert_eq!(compute_new_roles_str("athlete", rank, "user", "athlete"), "athlete");
            assert_eq!(compute_new_roles_str("", rank, "user athlete", ""), "");
        }
    }

    #[test]
    fn promoting_held_role_is_a_no_op() {
        assert_eq!(compute_new_roles_str("athlete", 500, "athlete", ""), "athlete");
    }

    #[test]
    fn output_is_canonical_even_for_messy_input() {
        assert_eq!(
            compute_new_roles_str("coach ATHLETE wizard coach", 500, "Admin user", "wizard"),
            "user athlete coach admin"
        );
    }

    #[test]
    fn demotion_applies_after_promotion() {
        assert_eq!(compute_new_roles_str("", 500, "coach", "coach"), "");
    }

    #[test]
    fn invalid_requests_are_ignored() {
        assert_eq!(compute_new_roles_str("athlete", 500, "wizard", "sorcerer"), "athlete");
    }
}
