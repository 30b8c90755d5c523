pub mod auth;
pub mod json;
pub mod response;

pub use auth::basic_auth_middleware;
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};
