// Handlers behind HTTP Basic authentication. Each receives the
// authenticated `Principal` through request extensions.

pub mod courses; // POST /api/courses, PUT|DELETE /api/courses/:id
pub mod programs; // /api/programs[/:id]
pub mod users; // GET /api/users, PUT /api/users/:id

pub use courses::{create as course_create, delete as course_delete, update as course_update};
pub use programs::{
    create as program_create, get as program_get, list as program_list, update as program_update,
};
pub use users::{update as user_update, whoami as user_whoami};
