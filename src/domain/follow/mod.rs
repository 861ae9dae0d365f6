//! Follow graph domain
//!
//! Directed follower -> followed edges between users.

mod entity;
mod repository;

pub use entity::{FollowControl, FollowCounts, FollowRelationship};
pub use repository::FollowRepository;
