pub mod password;
pub mod roles;
