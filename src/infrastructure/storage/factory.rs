//! Storage factory for runtime backend selection

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::follow::FollowRepository;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::follow::{InMemoryFollowRepository, PostgresFollowRepository};
use crate::infrastructure::user::{InMemoryUserRepository, PostgresUserRepository};

use super::migrations::run_migrations;
use super::postgres::{connect, PostgresConfig};

/// Supported storage backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Process-local maps (for testing/development)
    #[default]
    Memory,
    Postgres,
}

impl std::str::FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::Memory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(DomainError::internal(format!(
                "Unknown storage backend '{}'",
                other
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageType,
    pub postgres: PostgresConfig,
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self {
            backend: StorageType::Postgres,
            postgres: config,
        }
    }
}

/// The repositories a running instance works against
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            follows: Arc::new(InMemoryFollowRepository::new()),
        }
    }
}

/// Factory for creating repositories
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Build repositories for the configured backend, migrating Postgres
    pub async fn create(config: &StorageConfig) -> Result<Repositories, DomainError> {
        match config.backend {
            StorageType::Memory => Ok(Repositories::in_memory()),
            StorageType::Postgres => {
                let pool = connect(&config.postgres).await?;
                run_migrations(&pool).await?;

                Ok(Repositories {
                    users: Arc::new(PostgresUserRepository::new(pool.clone())),
                    follows: Arc::new(PostgresFollowRepository::new(pool)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!("memory".parse::<StorageType>().unwrap(), StorageType::Memory);
        assert_eq!("In-Memory".parse::<StorageType>().unwrap(), StorageType::Memory);
        assert_eq!("postgresql".parse::<StorageType>().unwrap(), StorageType::Postgres);
        assert_eq!("pg".parse::<StorageType>().unwrap(), StorageType::Postgres);
        assert!("redis".parse::<StorageType>().is_err());
    }

    #[test]
    fn test_default_is_memory() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageType::Memory);
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let repos = StorageFactory::create(&StorageConfig::in_memory())
            .await
            .unwrap();

        assert_eq!(repos.users.count().await.unwrap(), 0);
    }
}
