use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::models::{
    Course, CourseChanges, NewCourse, NewProgram, NewUser, ProfileChanges, Program,
    ProgramChanges, User,
};
use super::store::{Store, StoreError, UserLookup, EMAIL_TAKEN};
use crate::config::DatabaseConfig;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              BIGSERIAL PRIMARY KEY,
        roles           TEXT NOT NULL DEFAULT '',
        first_name      TEXT NOT NULL,
        last_name       TEXT NOT NULL,
        email_address   TEXT NOT NULL UNIQUE,
        password        TEXT NOT NULL,
        date_of_birth   DATE,
        biological_sex  TEXT,
        phone           TEXT,
        city            TEXT,
        biography       VARCHAR(1024),
        avatar_url      TEXT,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id                BIGSERIAL PRIMARY KEY,
        user_id           BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title             TEXT NOT NULL,
        description       TEXT NOT NULL,
        estimated_time    TEXT,
        materials_needed  TEXT,
        created_at        TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at        TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS programs (
        id           BIGSERIAL PRIMARY KEY,
        user_id      BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title        TEXT NOT NULL,
        is_private   BOOLEAN NOT NULL,
        description  TEXT NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];

const USER_COLUMNS: &str = "id, roles, first_name, last_name, email_address, password, \
    date_of_birth, biological_sex, phone, city, biography, avatar_url, created_at, updated_at";

const COURSE_COLUMNS: &str = "id, user_id, title, description, estimated_time, materials_needed, \
    created_at, updated_at";

const PROGRAM_COLUMNS: &str = "id, user_id, title, is_private, description, created_at, updated_at";

/// Postgres-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the configured URL (falling back to `DATABASE_URL`).
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let connection_string = build_connection_string(config.url.as_deref())?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;
        info!("Connected database pool (max {} connections)", config.max_connections);
        Ok(Self::new(pool))
    }

    /// Creates the tables when missing. Safe to run on every start.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ready");
        Ok(())
    }
}

fn build_connection_string(configured: Option<&str>) -> Result<String, StoreError> {
    let base = match configured {
        Some(url) => url.to_string(),
        None => std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?,
    };
    let url = url::Url::parse(&base).map_err(|_| StoreError::InvalidDatabaseUrl)?;
    match url.scheme() {
        "postgres" | "postgresql" => Ok(url.into()),
        _ => Err(StoreError::InvalidDatabaseUrl),
    }
}

/// Unique violations on insert/update of a user can only come from the email column.
fn map_user_write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(EMAIL_TAKEN.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl UserLookup for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email_address = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (roles, first_name, last_name, email_address, password, \
             date_of_birth, \
             biological_sex, phone, city, biography, avatar_url) \
             VALUES ('', $1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.email_address)
            .bind(user.password_hash)
            .bind(user.date_of_birth)
            .bind(user.biological_sex)
            .bind(user.phone)
            .bind(user.city)
            .bind(user.biography)
            .bind(user.avatar_url)
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_write_error)
    }

    async fn update_user_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET \
               first_name = COALESCE($2, first_name), \
               last_name = COALESCE($3, last_name), \
               email_address = COALESCE($4, email_address), \
               password = COALESCE($5, password), \
               date_of_birth = COALESCE($6, date_of_birth), \
               biological_sex = COALESCE($7, biological_sex), \
               phone = COALESCE($8, phone), \
               city = COALESCE($9, city), \
               biography = COALESCE($10, biography), \
               avatar_url = COALESCE($11, avatar_url), \
               updated_at = now() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.email_address)
            .bind(changes.password_hash)
            .bind(changes.date_of_birth)
            .bind(changes.biological_sex)
            .bind(changes.phone)
            .bind(changes.city)
            .bind(changes.biography)
            .bind(changes.avatar_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_write_error)?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))
    }

    async fn update_user_roles(&self, id: i64, roles: &str) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET roles = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(roles)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let sql = format!("SELECT {} FROM courses ORDER BY id", COURSE_COLUMNS);
        Ok(sqlx::query_as::<_, Course>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>, StoreError> {
        let sql = format!("SELECT {} FROM courses WHERE id = $1", COURSE_COLUMNS);
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_course(&self, owner_id: i64, course: NewCourse) -> Result<Course, StoreError> {
        let sql = format!(
            "INSERT INTO courses (user_id, title, description, estimated_time, materials_needed) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COURSE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(owner_id)
            .bind(course.title)
            .bind(course.description)
            .bind(course.estimated_time)
            .bind(course.materials_needed)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_course(&self, id: i64, changes: CourseChanges) -> Result<Course, StoreError> {
        let sql = format!(
            "UPDATE courses SET \
               title = COALESCE($2, title), \
               description = COALESCE($3, description), \
               estimated_time = COALESCE($4, estimated_time), \
               materials_needed = COALESCE($5, materials_needed), \
               updated_at = now() \
             WHERE id = $1 RETURNING {}",
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.estimated_time)
            .bind(changes.materials_needed)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("course {}", id)))
    }

    async fn delete_course(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("course {}", id)));
        }
        Ok(())
    }

    async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        let sql = format!("SELECT {} FROM programs ORDER BY id", PROGRAM_COLUMNS);
        Ok(sqlx::query_as::<_, Program>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_program(&self, id: i64) -> Result<Option<Program>, StoreError> {
        let sql = format!("SELECT {} FROM programs WHERE id = $1", PROGRAM_COLUMNS);
        Ok(sqlx::query_as::<_, Program>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_program(
        &self,
        owner_id: i64,
        program: NewProgram,
    ) -> Result<Program, StoreError> {
        let sql = format!(
            "INSERT INTO programs (user_id, title, is_private, description) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            PROGRAM_COLUMNS
        );
        Ok(sqlx::query_as::<_, Program>(&sql)
            .bind(owner_id)
            .bind(program.title)
            .bind(program.is_private)
            .bind(program.description)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_program(
        &self,
        id: i64,
        changes: ProgramChanges,
    ) -> Result<Program, StoreError> {
        let sql = format!(
            "UPDATE programs SET \
               title = COALESCE($2, title), \
               is_private = COALESCE($3, is_private), \
               description = COALESCE($4, description), \
               updated_at = now() \
             WHERE id = $1 RETURNING {}",
            PROGRAM_COLUMNS
        );
        sqlx::query_as::<_, Program>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.is_private)
            .bind(changes.description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("program {}", id)))
    }
}
