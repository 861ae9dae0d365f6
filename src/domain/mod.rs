//! Domain layer - Core business logic and entities

pub mod error;
pub mod follow;
pub mod user;

pub use error::DomainError;
pub use follow::{FollowControl, FollowCounts, FollowRelationship, FollowRepository};
pub use user::{
    DigestKind, Field, FieldError, Reason, User, UserId, UserRepository, ValidationErrors,
};
