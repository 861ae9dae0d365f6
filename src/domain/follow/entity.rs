//! Follow relationship entity

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Directed edge: `follower` follows `followed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowRelationship {
    follower_id: UserId,
    followed_id: UserId,
    created_at: DateTime<Utc>,
}

impl FollowRelationship {
    /// Create an edge; self-follow is rejected
    pub fn new(follower_id: UserId, followed_id: UserId) -> Result<Self, DomainError> {
        if follower_id == followed_id {
            return Err(DomainError::invalid_operation(
                "Users cannot follow themselves",
            ));
        }

        Ok(Self {
            follower_id,
            followed_id,
            created_at: Utc::now(),
        })
    }

    pub fn follower_id(&self) -> &UserId {
        &self.follower_id
    }

    pub fn followed_id(&self) -> &UserId {
        &self.followed_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Edge counts shown on a profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FollowCounts {
    pub following: usize,
    pub followers: usize,
}

/// State of the follow button a viewer sees on someone's profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowControl {
    /// Viewer is looking at their own profile
    Hidden,
    Follow,
    Unfollow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_relationship() {
        let a = UserId::generate();
        let b = UserId::generate();

        let edge = FollowRelationship::new(a, b).unwrap();
        assert_eq!(edge.follower_id(), &a);
        assert_eq!(edge.followed_id(), &b);
    }

    #[test]
    fn test_self_follow_rejected() {
        let a = UserId::generate();

        let result = FollowRelationship::new(a, a);
        assert!(matches!(result, Err(DomainError::InvalidOperation { .. })));
    }

    #[test]
    fn test_follow_control_serialization() {
        let json = serde_json::to_string(&FollowControl::Unfollow).unwrap();
        assert_eq!(json, "\"unfollow\"");
    }
}
