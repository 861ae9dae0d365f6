//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Implementations must enforce email uniqueness atomically: when `create`
/// or `update` would produce a second user with the same (already
/// normalized) email, they fail with a `Validation` error on the email field
/// carrying `Reason::Taken`.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by normalized email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Update an existing user in place
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Delete a user; returns false if it did not exist
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// Count all users
    async fn count(&self) -> Result<usize, DomainError>;

    async fn exists(&self, id: &UserId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }

    /// Check if a normalized email is already claimed
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::user::{Field, Reason};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock user repository for testing
    #[derive(Debug, Default)]
    pub struct MockUserRepository {
        users: Arc<RwLock<HashMap<UserId, User>>>,
        should_fail: Arc<RwLock<bool>>,
    }

    impl MockUserRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Set whether operations should fail
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::storage("Mock repository configured to fail"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
            self.check_should_fail().await?;
            Ok(self.users.read().await.get(id).cloned())
        }

        async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
            self.check_should_fail().await?;
            let users = self.users.read().await;
            Ok(users.values().find(|u| u.email() == email).cloned())
        }

        async fn create(&self, user: User) -> Result<User, DomainError> {
            self.check_should_fail().await?;
            let mut users = self.users.write().await;

            if users.values().any(|u| u.email() == user.email()) {
                return Err(DomainError::invalid_field(Field::Email, Reason::Taken));
            }

            users.insert(*user.id(), user.clone());
            Ok(user)
        }

        async fn update(&self, user: &User) -> Result<User, DomainError> {
            self.check_should_fail().await?;
            let mut users = self.users.write().await;

            if !users.contains_key(user.id()) {
                return Err(DomainError::not_found(format!(
                    "User '{}' not found",
                    user.id()
                )));
            }

            users.insert(*user.id(), user.clone());
            Ok(user.clone())
        }

        async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
            self.check_should_fail().await?;
            Ok(self.users.write().await.remove(id).is_some())
        }

        async fn count(&self) -> Result<usize, DomainError> {
            self.check_should_fail().await?;
            Ok(self.users.read().await.len())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_create_and_get() {
            let repo = MockUserRepository::new();
            let user = User::new("Taro", "taro@example.com", "digest");

            repo.create(user.clone()).await.unwrap();

            let retrieved = repo.get(user.id()).await.unwrap().unwrap();
            assert_eq!(retrieved.email(), "taro@example.com");
            assert!(repo.email_exists("taro@example.com").await.unwrap());
        }

        #[tokio::test]
        async fn test_failure_mode() {
            let repo = MockUserRepository::new();
            repo.set_should_fail(true).await;

            let result = repo.count().await;
            assert!(matches!(result, Err(DomainError::Storage { .. })));
        }
    }
}
