//! Account Graph
//!
//! User identity and follow-graph core for a social web application:
//! - Validated signup with normalized, unique emails
//! - Password and remember-token authentication against stored digests
//! - Directed follow relationships indexed by both endpoints
//!
//! HTTP handlers sit outside this crate and call into [`AppServices`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::{DomainError, FollowRepository, UserRepository};
use infrastructure::follow::FollowService;
use infrastructure::storage::{Repositories, StorageFactory};
use infrastructure::user::{Argon2Hasher, TokenDigester, UserService};

/// User service over whichever backend is configured
pub type Users = UserService<dyn UserRepository, Argon2Hasher>;

/// Follow service over whichever backend is configured
pub type Follows = FollowService<dyn UserRepository, dyn FollowRepository>;

/// Services exposed to request handlers
#[derive(Debug)]
pub struct AppServices {
    pub users: Users,
    pub follows: Follows,
}

impl AppServices {
    /// Wire services over existing repositories
    pub fn from_repositories(repositories: Repositories, config: &AppConfig) -> Self {
        let tokens =
            TokenDigester::new().with_token_bytes(config.security.remember_token_bytes);

        let users = UserService::new(Arc::clone(&repositories.users), Arc::new(Argon2Hasher::new()))
            .with_token_digester(tokens)
            .with_follow_repository(Arc::clone(&repositories.follows));

        let follows = FollowService::new(repositories.users, repositories.follows);

        Self { users, follows }
    }

    /// Services over fresh in-memory repositories
    pub fn in_memory() -> Self {
        Self::from_repositories(Repositories::in_memory(), &AppConfig::default())
    }
}

/// Connect the configured storage backend and wire the services
pub async fn create_services(config: &AppConfig) -> Result<AppServices, DomainError> {
    let repositories = StorageFactory::create(&config.storage).await?;
    Ok(AppServices::from_repositories(repositories, config))
}
