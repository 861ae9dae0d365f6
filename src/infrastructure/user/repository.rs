//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::user::{Field, Reason, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, User>,
    /// Normalized email -> user ID; doubles as the uniqueness constraint
    email_index: HashMap<String, UserId>,
}

/// In-memory implementation of UserRepository
///
/// Both maps sit behind one lock, so the uniqueness check and the insert
/// happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let mut table = UserTable::default();

        for user in users {
            table.email_index.insert(user.email().to_string(), *user.id());
            table.users.insert(*user.id(), user);
        }

        Self {
            table: RwLock::new(table),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.users.contains_key(user.id()) {
            return Err(DomainError::storage(format!(
                "User with ID '{}' already exists",
                user.id()
            )));
        }

        if table.email_index.contains_key(user.email()) {
            return Err(DomainError::invalid_field(Field::Email, Reason::Taken));
        }

        table.email_index.insert(user.email().to_string(), *user.id());
        table.users.insert(*user.id(), user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        let old_email = match table.users.get(user.id()) {
            Some(existing) => existing.email().to_string(),
            None => {
                return Err(DomainError::not_found(format!(
                    "User '{}' not found",
                    user.id()
                )));
            }
        };

        if old_email != user.email() {
            if table.email_index.contains_key(user.email()) {
                return Err(DomainError::invalid_field(Field::Email, Reason::Taken));
            }

            table.email_index.remove(&old_email);
            table.email_index.insert(user.email().to_string(), *user.id());
        }

        table.users.insert(*user.id(), user.clone());

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.users.remove(id) {
            Some(user) => {
                table.email_index.remove(user.email());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.table.read().await.users.len())
    }
}
