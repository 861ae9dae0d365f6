//! PostgreSQL follow repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::follow::{FollowRelationship, FollowRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of FollowRepository
///
/// Edges live in `relationships`, keyed by `(follower_id, followed_id)` with
/// a secondary index on `followed_id`.
#[derive(Debug, Clone)]
pub struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn insert(&self, relationship: FollowRelationship) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO relationships (follower_id, followed_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            "#,
        )
        .bind(*relationship.follower_id().as_uuid())
        .bind(*relationship.followed_id().as_uuid())
        .bind(relationship.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation())
            {
                DomainError::not_found("Cannot follow a user that does not exist")
            } else {
                DomainError::storage(format!("Failed to insert relationship: {}", e))
            }
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(
        &self,
        follower_id: &UserId,
        followed_id: &UserId,
    ) -> Result<bool, DomainError> {
        let result =
            sqlx::query("DELETE FROM relationships WHERE follower_id = $1 AND followed_id = $2")
                .bind(*follower_id.as_uuid())
                .bind(*followed_id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to delete relationship: {}", e))
                })?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(
        &self,
        follower_id: &UserId,
        followed_id: &UserId,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM relationships WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(*follower_id.as_uuid())
        .bind(*followed_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check relationship: {}", e)))
    }

    async fn following(&self, user_id: &UserId) -> Result<Vec<UserId>, DomainError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT followed_id FROM relationships WHERE follower_id = $1 ORDER BY created_at, followed_id",
        )
        .bind(*user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list following: {}", e)))?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }

    async fn followers(&self, user_id: &UserId) -> Result<Vec<UserId>, DomainError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT follower_id FROM relationships WHERE followed_id = $1 ORDER BY created_at, follower_id",
        )
        .bind(*user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list followers: {}", e)))?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }

    async fn count_following(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM relationships WHERE follower_id = $1")
                .bind(*user_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to count following: {}", e)))?;

        Ok(count as usize)
    }

    async fn count_followers(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM relationships WHERE followed_id = $1")
                .bind(*user_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to count followers: {}", e)))?;

        Ok(count as usize)
    }

    async fn remove_all_for(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let result =
            sqlx::query("DELETE FROM relationships WHERE follower_id = $1 OR followed_id = $1")
                .bind(*user_id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to delete relationships: {}", e))
                })?;

        Ok(result.rows_affected() as usize)
    }
}
