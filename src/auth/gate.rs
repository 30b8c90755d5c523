use serde::Serialize;
use thiserror::Error;

use super::credentials::{authenticate, AuthFailure, Credentials};
use super::password::Passwords;
use super::principal::Principal;
use super::roles::{RankRequirement, Role};
use crate::database::store::UserLookup;

/// A resource with exactly one owning user, fixed at creation.
pub trait Owned {
    /// Resource name used in denial messages.
    const KIND: &'static str;

    fn owner_id(&self) -> i64;
}

/// An owned resource that may be hidden from everyone but its owner.
pub trait Visible: Owned {
    fn is_private(&self) -> bool;
}

/// Rank-gated operations and the minimum each one demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ViewPrograms,
    CreateProgram,
    EditProgram,
    MutateUserRoles,
}

/// Only coaches and above may change anyone's roles.
pub const ROLE_MUTATION_REQUIREMENT: RankRequirement = RankRequirement::Above(Role::Athlete);

impl Operation {
    pub const fn requirement(self) -> RankRequirement {
        match self {
            Operation::ViewPrograms => RankRequirement::AtLeast(Role::Athlete),
            Operation::CreateProgram => RankRequirement::AtLeast(Role::Coach),
            Operation::EditProgram => RankRequirement::AtLeast(Role::Coach),
            Operation::MutateUserRoles => ROLE_MUTATION_REQUIREMENT,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Operation::ViewPrograms => "view training programs",
            Operation::CreateProgram => "create training programs",
            Operation::EditProgram => "edit training programs",
            Operation::MutateUserRoles => "change other users' roles",
        }
    }

    fn denial_reason(self) -> String {
        match self.requirement() {
            RankRequirement::AtLeast(role) => format!(
                "You need to have at least \"{}\" privileges to {}",
                role,
                self.description()
            ),
            RankRequirement::Above(role) => format!(
                "You need privileges above \"{}\" to {}",
                role,
                self.description()
            ),
        }
    }
}

/// Terminal negative outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denied {
    /// Every authentication failure collapses into this one variant.
    #[error("Access Denied")]
    AccessDenied,

    #[error("{}", .operation.denial_reason())]
    InsufficientRank { operation: Operation, rank: u16 },

    #[error("The {kind} does not belong to you")]
    NotOwner { kind: &'static str },

    #[error("The {kind} you are looking for does not exist")]
    ResourceAbsent { kind: &'static str },

    /// The user store could not be consulted. Not an authorization outcome
    /// and never reported as one.
    #[error("Authorization temporarily unavailable")]
    Unavailable(String),
}

impl From<AuthFailure> for Denied {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::NoCredentials
            | AuthFailure::UserNotFound(_)
            | AuthFailure::BadCredentials(_) => Denied::AccessDenied,
            AuthFailure::Lookup(e) => Denied::Unavailable(e.to_string()),
        }
    }
}

/// Authentication step of the gate.
pub async fn authorize<L>(
    lookup: &L,
    passwords: &Passwords,
    credentials: Option<Credentials>,
) -> Result<Principal, Denied>
where
    L: UserLookup + ?Sized,
{
    authenticate(lookup, passwords, credentials)
        .await
        .map_err(Denied::from)
}

pub fn has_rank(principal: &Principal, operation: Operation) -> bool {
    operation.requirement().is_met(principal.rank())
}

pub fn require_rank(principal: &Principal, operation: Operation) -> Result<(), Denied> {
    if has_rank(principal, operation) {
        Ok(())
    } else {
        tracing::debug!(
            "Rank {} of '{}' insufficient for {:?}",
            principal.rank(),
            principal.identity(),
            operation
        );
        Err(Denied::InsufficientRank {
            operation,
            rank: principal.rank(),
        })
    }
}

/// Rank plays no part here: only the owner passes.
pub fn is_owner<R: Owned + ?Sized>(principal: &Principal, resource: &R) -> bool {
    resource.owner_id() == principal.id()
}

pub fn require_ownership<R: Owned + ?Sized>(
    principal: &Principal,
    resource: &R,
) -> Result<(), Denied> {
    if is_owner(principal, resource) {
        Ok(())
    } else {
        Err(Denied::NotOwner { kind: R::KIND })
    }
}

/// Public resources are visible to everyone, private ones to their owner.
pub fn is_visible_to<R: Visible + ?Sized>(principal: &Principal, resource: &R) -> bool {
    !resource.is_private() || is_owner(principal, resource)
}

pub fn visible_resources<R, I>(principal: &Principal, resources: I) -> Vec<R>
where
    R: Visible,
    I: IntoIterator<Item = R>,
{
    resources
        .into_iter()
        .filter(|r| is_visible_to(principal, r))
        .collect()
}

/// Looks up a resource for reading, hiding it when it is not visible.
pub fn require_visible<R: Visible>(
    principal: &Principal,
    resource: Option<R>,
) -> Result<R, Denied> {
    let resource = resource.ok_or(Denied::ResourceAbsent { kind: R::KIND })?;
    if is_visible_to(principal, &resource) {
        Ok(resource)
    } else {
        Err(Denied::NotOwner { kind: R::KIND })
    }
}
