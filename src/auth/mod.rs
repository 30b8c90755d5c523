//! Authorization core: role ranking, role-string codec, credential
//! verification, decision gate and role mutation.

pub mod credentials;
pub mod gate;
pub mod mutation;
pub mod password;
pub mod principal;
pub mod role_set;
pub mod roles;

pub use credentials::{authenticate, AuthFailure, Credentials};
pub use gate::{
    authorize, has_rank, is_owner, is_visible_to, require_ownership, require_rank,
    require_visible, visible_resources, Denied, Operation, Owned, Visible,
};
pub use mutation::{can_mutate_roles, compute_new_roles, compute_new_roles_str};
pub use password::{PasswordError, Passwords};
pub use principal::Principal;
pub use role_set::{highest_rank, RoleSet};
pub use roles::{name_of, rank_of, RankRequirement, Role, RANK_NONE};
