//! Database migrations

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Versioned migrator tracking applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Apply a migration unless already recorded; returns whether it ran
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let fail = |e: sqlx::Error| {
            DomainError::storage(format!(
                "Failed to run migration {}: {}",
                migration.version, e
            ))
        };

        let mut tx = self.pool.begin().await.map_err(fail)?;

        // raw_sql: migration bodies hold several statements
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        tx.commit().await.map_err(fail)?;

        info!(version = migration.version, description = migration.description, "Applied migration");

        Ok(true)
    }

    /// Revert a migration if recorded; returns whether it ran
    pub async fn revert_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if !self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let fail = |e: sqlx::Error| {
            DomainError::storage(format!(
                "Failed to revert migration {}: {}",
                migration.version, e
            ))
        };

        let mut tx = self.pool.begin().await.map_err(fail)?;

        sqlx::raw_sql(migration.down)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        tx.commit().await.map_err(fail)?;

        info!(version = migration.version, "Reverted migration");

        Ok(true)
    }

    /// Latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

/// A versioned schema change
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

/// Schema for users and follow relationships, in apply order
pub fn account_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Create users table",
            up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                name VARCHAR(50) NOT NULL,
                email VARCHAR(255) NOT NULL,
                password_digest TEXT NOT NULL,
                remember_digest TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT users_email_key UNIQUE (email),
                CONSTRAINT users_email_lowercase CHECK (email = LOWER(email))
            );
            "#,
            down: r#"
            DROP TABLE IF EXISTS users;
            "#,
        },
        Migration {
            version: 2,
            description: "Create relationships table",
            up: r#"
            CREATE TABLE IF NOT EXISTS relationships (
                follower_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                followed_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (follower_id, followed_id),
                CONSTRAINT relationships_no_self_follow CHECK (follower_id <> followed_id)
            );
            CREATE INDEX IF NOT EXISTS idx_relationships_followed_id ON relationships(followed_id);
            "#,
            down: r#"
            DROP TABLE IF EXISTS relationships;
            "#,
        },
    ]
}

/// Run all pending migrations; returns how many were applied
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    let mut applied = 0;

    for migration in account_migrations() {
        if migrator.run_migration(&migration).await? {
            applied += 1;
        }
    }

    Ok(applied)
}
