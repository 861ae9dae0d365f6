//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::user::{Field, Reason, User, UserId, UserRepository};
use crate::domain::DomainError;

/// Name of the unique constraint on `users.email`
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

const USER_COLUMNS: &str =
    "id, name, email, password_digest, remember_digest, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_digest, remember_digest,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*user.id().as_uuid())
        .bind(user.name())
        .bind(user.email())
        .bind(user.password_digest())
        .bind(user.remember_digest())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "create"))?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_digest = $4, remember_digest = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(*user.id().as_uuid())
        .bind(user.name())
        .bind(user.email())
        .bind(user.password_digest())
        .bind(user.remember_digest())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "update"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.id()
            )));
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        // relationships rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count as usize)
    }
}

/// Map a failed write, surfacing the email constraint as a validation error
fn map_write_error(error: sqlx::Error, action: &str) -> DomainError {
    let is_email_conflict = error
        .as_database_error()
        .map(|db| db.is_unique_violation() && db.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT))
        .unwrap_or(false);

    if is_email_conflict {
        DomainError::invalid_field(Field::Email, Reason::Taken)
    } else {
        DomainError::storage(format!("Failed to {} user: {}", action, error))
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Invalid user row: {}", e));

    let id: Uuid = row.try_get("id").map_err(read)?;
    let name: String = row.try_get("name").map_err(read)?;
    let email: String = row.try_get("email").map_err(read)?;
    let password_digest: String = row.try_get("password_digest").map_err(read)?;
    let remember_digest: Option<String> = row.try_get("remember_digest").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(read)?;

    Ok(User::from_parts(
        UserId::from_uuid(id),
        name,
        email,
        password_digest,
        remember_digest,
        created_at,
        updated_at,
    ))
}
