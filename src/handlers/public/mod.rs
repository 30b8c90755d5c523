// Handlers reachable without credentials.

pub mod courses; // GET /api/courses[/:id]
pub mod users; // POST /api/users

pub use courses::{get as course_get, list as course_list};
pub use users::register as user_register;
