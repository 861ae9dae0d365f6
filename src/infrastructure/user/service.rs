//! User service for signup, authentication and credential management

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::follow::FollowRepository;
use crate::domain::user::{
    normalize_email, validate_new_user, validate_password, DigestKind, Field, Reason, User,
    UserId, UserRepository,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;
use super::token::TokenDigester;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Request for rotating a user's password
#[derive(Debug, Clone)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

/// User service for signup, login and credential management
#[derive(Debug)]
pub struct UserService<R: UserRepository + ?Sized, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    tokens: TokenDigester,
    follows: Option<Arc<dyn FollowRepository>>,
}

impl<R: UserRepository + ?Sized, H: PasswordHasher> UserService<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self {
            repository,
            hasher,
            tokens: TokenDigester::new(),
            follows: None,
        }
    }

    /// Use a custom remember-token digester
    pub fn with_token_digester(mut self, tokens: TokenDigester) -> Self {
        self.tokens = tokens;
        self
    }

    /// Remove follow edges together with deleted users
    pub fn with_follow_repository(mut self, follows: Arc<dyn FollowRepository>) -> Self {
        self.follows = Some(follows);
        self
    }

    /// Validate and persist a new user.
    ///
    /// Every field is checked before anything is written; the returned
    /// `Validation` error lists all violations. The plaintext password only
    /// lives as long as the request.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        let CreateUserRequest {
            name,
            email,
            password,
            password_confirmation,
        } = request;

        let email = normalize_email(&email);
        let mut errors = validate_new_user(&name, &email, &password, &password_confirmation);

        // Fast path for the form; the repository enforces it atomically
        if !errors.has_field(Field::Email) && self.repository.email_exists(&email).await? {
            errors.add(Field::Email, Reason::Taken);
        }

        if !errors.is_empty() {
            debug!(fields = ?errors.fields(), "Rejected user signup");
            return Err(DomainError::validation(errors));
        }

        let password_digest = self.hasher.hash(&password)?;
        drop(password);

        let user = self
            .repository
            .create(User::new(name, email, password_digest))
            .await?;

        info!(user_id = %user.id(), "User created");

        Ok(user)
    }

    pub async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    /// Case-insensitive lookup by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.repository.get_by_email(&normalize_email(email)).await
    }

    /// Check `plaintext` against the user's stored digest of `kind`.
    ///
    /// A missing digest is an ordinary `false`, decided before any hashing.
    pub fn authenticate_credential(&self, user: &User, kind: DigestKind, plaintext: &str) -> bool {
        let Some(digest) = user.digest(kind) else {
            return false;
        };

        match kind {
            DigestKind::Password => self.hasher.verify(plaintext, digest),
            DigestKind::Remember => self.tokens.verify(plaintext, digest),
        }
    }

    /// Login: look the user up by email and check the password.
    ///
    /// An unknown email still pays for one password verification.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = self.find_by_email(email).await? else {
            self.hasher.verify_absent(password);
            return Ok(None);
        };

        if !self.authenticate_credential(&user, DigestKind::Password, password) {
            debug!(user_id = %user.id(), "Password check failed");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Issue a remember token and store its digest.
    ///
    /// Returns the plaintext token for the caller's cookie; only the digest
    /// is persisted.
    pub async fn remember(&self, id: &UserId) -> Result<String, DomainError> {
        let mut user = self.require(id).await?;

        let issued = self.tokens.issue();
        user.set_remember_digest(Some(issued.digest));
        self.repository.update(&user).await?;

        info!(user_id = %id, "Remember token issued");

        Ok(issued.token)
    }

    /// Clear the stored remember digest
    pub async fn forget(&self, id: &UserId) -> Result<(), DomainError> {
        let mut user = self.require(id).await?;

        if user.remember_digest().is_none() {
            return Ok(());
        }

        user.set_remember_digest(None);
        self.repository.update(&user).await?;

        info!(user_id = %id, "Remember token cleared");

        Ok(())
    }

    /// Rotate the password after checking the current one
    pub async fn update_password(
        &self,
        id: &UserId,
        request: UpdatePasswordRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;

        if !self.authenticate_credential(&user, DigestKind::Password, &request.current_password) {
            return Err(DomainError::invalid_operation("Current password is incorrect"));
        }

        validate_password(&request.new_password, &request.new_password_confirmation)
            .into_result()
            .map_err(DomainError::validation)?;

        let digest = self.hasher.hash(&request.new_password)?;
        user.set_password_digest(digest);
        // A password change invalidates remembered sessions
        user.set_remember_digest(None);

        let user = self.repository.update(&user).await?;

        info!(user_id = %id, "Password updated");

        Ok(user)
    }

    /// Delete a user and every follow edge touching it.
    ///
    /// The user goes first: a follow racing the delete either lands before
    /// the edge sweep or is refused by the follow repository afterwards.
    pub async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        if !self.repository.delete(id).await? {
            return Ok(false);
        }

        if let Some(follows) = &self.follows {
            let removed = follows.remove_all_for(id).await?;
            debug!(user_id = %id, removed, "Removed follow edges");
        }

        info!(user_id = %id, "User deleted");

        Ok(true)
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    async fn require(&self, id: &UserId) -> Result<User, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }
}
