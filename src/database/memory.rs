use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::{
    Course, CourseChanges, NewCourse, NewProgram, NewUser, ProfileChanges, Program,
    ProgramChanges, User,
};
use super::store::{Store, StoreError, UserLookup, EMAIL_TAKEN};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    courses: BTreeMap<i64, Course>,
    programs: BTreeMap<i64, Program>,
    next_user_id: i64,
    next_course_id: i64,
    next_program_id: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Process-local store backed by ordered maps. Ids are assigned from 1 per
/// table, like a serial column.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user with an explicit role string. Seeding and tests only;
    /// the API path always creates users without roles.
    pub async fn insert_user_with_roles(
        &self,
        user: NewUser,
        roles: &str,
    ) -> Result<User, StoreError> {
        let created = self.create_user(user).await?;
        self.update_user_roles(created.id, roles).await
    }
}

#[async_trait]
impl UserLookup for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email_address == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email_address == user.email_address) {
            return Err(StoreError::Conflict(EMAIL_TAKEN.to_string()));
        }
        let now = Utc::now();
        let id = next(&mut tables.next_user_id);
        let record = User {
            id,
            roles: String::new(),
            first_name: user.first_name,
            last_name: user.last_name,
            email_address: user.email_address,
            password: user.password_hash,
            date_of_birth: user.date_of_birth,
            biological_sex: user.biological_sex,
            phone: user.phone,
            city: user.city,
            biography: user.biography,
            avatar_url: user.avatar_url,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, record.clone());
        Ok(record)
    }

    async fn update_user_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email_address {
            if tables.users.values().any(|u| u.id != id && &u.email_address == email) {
                return Err(StoreError::Conflict(EMAIL_TAKEN.to_string()));
            }
        }
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;

        if let Some(v) = changes.first_name {
            user.first_name = v;
        }
        if let Some(v) = changes.last_name {
            user.last_name = v;
        }
        if let Some(v) = changes.email_address {
            user.email_address = v;
        }
        if let Some(v) = changes.password_hash {
            user.password = v;
        }
        if let Some(v) = changes.date_of_birth {
            user.date_of_birth = Some(v);
        }
        if let Some(v) = changes.biological_sex {
            user.biological_sex = Some(v);
        }
        if let Some(v) = changes.phone {
            user.phone = Some(v);
        }
        if let Some(v) = changes.city {
            user.city = Some(v);
        }
        if let Some(v) = changes.biography {
            user.biography = Some(v);
        }
        if let Some(v) = changes.avatar_url {
            user.avatar_url = Some(v);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_user_roles(&self, id: i64, roles: &str) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        user.roles = roles.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.tables.read().await.courses.values().cloned().collect())
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>, StoreError> {
        Ok(self.tables.read().await.courses.get(&id).cloned())
    }

    async fn create_course(&self, owner_id: i64, course: NewCourse) -> Result<Course, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&owner_id) {
            return Err(StoreError::NotFound(format!("user {}", owner_id)));
        }
        let now = Utc::now();
        let id = next(&mut tables.next_course_id);
        let record = Course {
            id,
            user_id: owner_id,
            title: course.title,
            description: course.description,
            estimated_time: course.estimated_time,
            materials_needed: course.materials_needed,
            created_at: now,
            updated_at: now,
        };
        tables.courses.insert(id, record.clone());
        Ok(record)
    }

    async fn update_course(&self, id: i64, changes: CourseChanges) -> Result<Course, StoreError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("course {}", id)))?;
        if let Some(v) = changes.title {
            course.title = v;
        }
        if let Some(v) = changes.description {
            course.description = v;
        }
        if let Some(v) = changes.estimated_time {
            course.estimated_time = Some(v);
        }
        if let Some(v) = changes.materials_needed {
            course.materials_needed = Some(v);
        }
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    async fn delete_course(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .courses
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("course {}", id)))
    }

    async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        Ok(self.tables.read().await.programs.values().cloned().collect())
    }

    async fn find_program(&self, id: i64) -> Result<Option<Program>, StoreError> {
        Ok(self.tables.read().await.programs.get(&id).cloned())
    }

    async fn create_program(
        &self,
        owner_id: i64,
        program: NewProgram,
    ) -> Result<Program, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&owner_id) {
            return Err(StoreError::NotFound(format!("user {}", owner_id)));
        }
        let now = Utc::now();
        let id = next(&mut tables.next_program_id);
        let record = Program {
            id,
            user_id: owner_id,
            title: program.title,
            is_private: program.is_private,
            description: program.description,
            created_at: now,
            updated_at: now,
        };
        tables.programs.insert(id, record.clone());
        Ok(record)
    }

    async fn update_program(
        &self,
        id: i64,
        changes: ProgramChanges,
    ) -> Result<Program, StoreError> {
        let mut tables = self.tables.write().await;
        let program = tables
            .programs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("program {}", id)))?;
        if let Some(v) = changes.title {
            program.title = v;
        }
        if let Some(v) = changes.is_private {
            program.is_private = v;
        }
        if let Some(v) = changes.description {
            program.description = v;
        }
        program.updated_at = Utc::now();
        Ok(program.clone())
    }
}
