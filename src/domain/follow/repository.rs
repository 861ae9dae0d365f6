//! Follow repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::FollowRelationship;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Storage for follow edges, indexed by both endpoints
///
/// `insert` and `remove` must be safe to race: a duplicate insert or a double
/// remove is reported through the returned flag, never as an error.
/// `insert` fails with `NotFound` once either endpoint has been deleted, and
/// listings come back oldest edge first.
#[async_trait]
pub trait FollowRepository: Send + Sync + Debug {
    /// Store the edge; returns false if it already existed
    async fn insert(&self, relationship: FollowRelationship) -> Result<bool, DomainError>;

    /// Remove the edge; returns false if it did not exist
    async fn remove(&self, follower_id: &UserId, followed_id: &UserId)
    -> Result<bool, DomainError>;

    async fn exists(&self, follower_id: &UserId, followed_id: &UserId)
    -> Result<bool, DomainError>;

    /// Users that `user_id` follows
    async fn following(&self, user_id: &UserId) -> Result<Vec<UserId>, DomainError>;

    /// Users that follow `user_id`
    async fn followers(&self, user_id: &UserId) -> Result<Vec<UserId>, DomainError>;

    async fn count_following(&self, user_id: &UserId) -> Result<usize, DomainError> {
        Ok(self.following(user_id).await?.len())
    }

    async fn count_followers(&self, user_id: &UserId) -> Result<usize, DomainError> {
        Ok(self.followers(user_id).await?.len())
    }

    /// Drop every edge touching a deleted user; returns how many were removed.
    ///
    /// Later inserts naming `user_id` are refused.
    async fn remove_all_for(&self, user_id: &UserId) -> Result<usize, DomainError>;
}
