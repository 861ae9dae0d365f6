//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque user identifier, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which stored digest a credential check runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestKind {
    /// Login password, stored as an Argon2 hash
    Password,
    /// Session-persistence ("remember me") token
    Remember,
}

/// User entity
///
/// Instances are built by the user service after validation; the repository
/// round-trips them through [`User::from_parts`].
#[derive(Debug, Clone, Serialize)]
pub struct User {
    id: UserId,
    name: String,
    /// Always stored lowercased
    email: String,
    #[serde(skip_serializing)]
    password_digest: String,
    #[serde(skip_serializing)]
    remember_digest: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a freshly generated id
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_digest: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::generate(),
            name: name.into(),
            email: email.into(),
            password_digest: password_digest.into(),
            remember_digest: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from stored columns
    pub fn from_parts(
        id: UserId,
        name: String,
        email: String,
        password_digest: String,
        remember_digest: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            password_digest,
            remember_digest,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_digest(&self) -> &str {
        &self.password_digest
    }

    pub fn remember_digest(&self) -> Option<&str> {
        self.remember_digest.as_deref()
    }

    /// Stored digest for `kind`, or `None` when it was never set
    pub fn digest(&self, kind: DigestKind) -> Option<&str> {
        match kind {
            DigestKind::Password => Some(self.password_digest.as_str()),
            DigestKind::Remember => self.remember_digest(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_password_digest(&mut self, digest: impl Into<String>) {
        self.password_digest = digest.into();
        self.touch();
    }

    pub fn set_remember_digest(&mut self, digest: Option<String>) {
        self.remember_digest = digest;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
