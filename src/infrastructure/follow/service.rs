//! Follow service for the user follow graph

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::follow::{FollowControl, FollowCounts, FollowRelationship, FollowRepository};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// Follow service
///
/// Owns every edge; the user repository is only consulted to resolve
/// identities.
#[derive(Debug)]
pub struct FollowService<U: UserRepository + ?Sized, F: FollowRepository + ?Sized> {
    users: Arc<U>,
    follows: Arc<F>,
}

impl<U: UserRepository + ?Sized, F: FollowRepository + ?Sized> FollowService<U, F> {
    pub fn new(users: Arc<U>, follows: Arc<F>) -> Self {
        Self { users, follows }
    }

    /// Make `follower_id` follow `followed_id`.
    ///
    /// Following someone twice leaves a single edge. Following oneself is an
    /// `InvalidOperation` and writes nothing.
    pub async fn follow(&self, follower_id: &UserId, followed_id: &UserId) -> Result<(), DomainError> {
        let relationship = FollowRelationship::new(*follower_id, *followed_id)?;

        self.require_user(follower_id).await?;
        self.require_user(followed_id).await?;

        if self.follows.insert(relationship).await? {
            info!(follower_id = %follower_id, followed_id = %followed_id, "User followed");
        } else {
            debug!(follower_id = %follower_id, followed_id = %followed_id, "Already following");
        }

        Ok(())
    }

    /// Remove the edge if present; a missing edge is not an error
    pub async fn unfollow(&self, follower_id: &UserId, followed_id: &UserId) -> Result<(), DomainError> {
        if self.follows.remove(follower_id, followed_id).await? {
            info!(follower_id = %follower_id, followed_id = %followed_id, "User unfollowed");
        } else {
            debug!(follower_id = %follower_id, followed_id = %followed_id, "Was not following");
        }

        Ok(())
    }

    pub async fn is_following(
        &self,
        follower_id: &UserId,
        followed_id: &UserId,
    ) -> Result<bool, DomainError> {
        self.follows.exists(follower_id, followed_id).await
    }

    /// Same edge as `is_following`, read from the followed side
    pub async fn is_followed_by(
        &self,
        user_id: &UserId,
        possible_follower_id: &UserId,
    ) -> Result<bool, DomainError> {
        self.is_following(possible_follower_id, user_id).await
    }

    /// Users that `user_id` follows
    pub async fn following(&self, user_id: &UserId) -> Result<Vec<User>, DomainError> {
        let ids = self.follows.following(user_id).await?;
        self.resolve(ids).await
    }

    /// Users that follow `user_id`
    pub async fn followers(&self, user_id: &UserId) -> Result<Vec<User>, DomainError> {
        let ids = self.follows.followers(user_id).await?;
        self.resolve(ids).await
    }

    pub async fn counts(&self, user_id: &UserId) -> Result<FollowCounts, DomainError> {
        Ok(FollowCounts {
            following: self.follows.count_following(user_id).await?,
            followers: self.follows.count_followers(user_id).await?,
        })
    }

    /// Which follow button `viewer_id` gets on `profile_id`'s page.
    ///
    /// A viewer never gets a button on their own profile, so the page cannot
    /// issue a self-follow.
    pub async fn follow_control(
        &self,
        viewer_id: &UserId,
        profile_id: &UserId,
    ) -> Result<FollowControl, DomainError> {
        if viewer_id == profile_id {
            return Ok(FollowControl::Hidden);
        }

        if self.is_following(viewer_id, profile_id).await? {
            Ok(FollowControl::Unfollow)
        } else {
            Ok(FollowControl::Follow)
        }
    }

    async fn require_user(&self, id: &UserId) -> Result<(), DomainError> {
        if self.users.exists(id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("User '{}' not found", id)))
        }
    }

    async fn resolve(&self, ids: Vec<UserId>) -> Result<Vec<User>, DomainError> {
        let mut users = Vec::with_capacity(ids.len());

        for id in ids {
            // An edge can outlive its user briefly when deletes race
            if let Some(user) = self.users.get(&id).await? {
                users.push(user);
            }
        }

        Ok(users)
    }
}
