//! In-memory follow repository implementation

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::domain::follow::{FollowRelationship, FollowRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// user -> (neighbour -> insertion sequence)
type Adjacency = HashMap<UserId, HashMap<UserId, u64>>;

#[derive(Debug, Default)]
struct EdgeIndex {
    /// follower -> users they follow
    by_follower: Adjacency,
    /// followed -> users following them
    by_followed: Adjacency,
    next_seq: u64,
    /// Users whose edges were dropped on delete; they take no new edges
    deleted: HashSet<UserId>,
}

impl EdgeIndex {
    fn link(&mut self, follower_id: UserId, followed_id: UserId) -> bool {
        let outgoing = self.by_follower.entry(follower_id).or_default();
        if outgoing.contains_key(&followed_id) {
            return false;
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        outgoing.insert(followed_id, seq);
        self.by_followed
            .entry(followed_id)
            .or_default()
            .insert(follower_id, seq);

        true
    }

    fn unlink(&mut self, follower_id: &UserId, followed_id: &UserId) -> bool {
        let removed = remove_from(&mut self.by_follower, follower_id, followed_id);
        remove_from(&mut self.by_followed, followed_id, follower_id);
        removed
    }
}

/// Remove `value` from the map at `key`, dropping the map once empty
fn remove_from(index: &mut Adjacency, key: &UserId, value: &UserId) -> bool {
    let Some(neighbours) = index.get_mut(key) else {
        return false;
    };

    let removed = neighbours.remove(value).is_some();

    if neighbours.is_empty() {
        index.remove(key);
    }

    removed
}

/// Neighbours of `key` in the order their edges were created
fn in_insertion_order(index: &Adjacency, key: &UserId) -> Vec<UserId> {
    let Some(neighbours) = index.get(key) else {
        return Vec::new();
    };

    let mut ordered: Vec<(u64, UserId)> =
        neighbours.iter().map(|(id, seq)| (*seq, *id)).collect();
    ordered.sort_unstable();

    ordered.into_iter().map(|(_, id)| id).collect()
}

/// In-memory implementation of FollowRepository
///
/// Both indexes live under one lock and are always updated together.
/// Listings come back oldest edge first.
#[derive(Debug, Default)]
pub struct InMemoryFollowRepository {
    edges: RwLock<EdgeIndex>,
}

impl InMemoryFollowRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FollowRepository for InMemoryFollowRepository {
    async fn insert(&self, relationship: FollowRelationship) -> Result<bool, DomainError> {
        let follower_id = *relationship.follower_id();
        let followed_id = *relationship.followed_id();

        let mut edges = self.edges.write().await;

        if edges.deleted.contains(&follower_id) || edges.deleted.contains(&followed_id) {
            return Err(DomainError::not_found(
                "Cannot follow a user that does not exist",
            ));
        }

        Ok(edges.link(follower_id, followed_id))
    }

    async fn remove(
        &self,
        follower_id: &UserId,
        followed_id: &UserId,
    ) -> Result<bool, DomainError> {
        Ok(self.edges.write().await.unlink(follower_id, followed_id))
    }

    async fn exists(
        &self,
        follower_id: &UserId,
        followed_id: &UserId,
    ) -> Result<bool, DomainError> {
        let edges = self.edges.read().await;

        Ok(edges
            .by_follower
            .get(follower_id)
            .is_some_and(|neighbours| neighbours.contains_key(followed_id)))
    }

    async fn following(&self, user_id: &UserId) -> Result<Vec<UserId>, DomainError> {
        let edges = self.edges.read().await;
        Ok(in_insertion_order(&edges.by_follower, user_id))
    }

    async fn followers(&self, user_id: &UserId) -> Result<Vec<UserId>, DomainError> {
        let edges = self.edges.read().await;
        Ok(in_insertion_order(&edges.by_followed, user_id))
    }

    async fn count_following(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let edges = self.edges.read().await;
        Ok(edges.by_follower.get(user_id).map_or(0, HashMap::len))
    }

    async fn count_followers(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let edges = self.edges.read().await;
        Ok(edges.by_followed.get(user_id).map_or(0, HashMap::len))
    }

    async fn remove_all_for(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let mut edges = self.edges.write().await;

        edges.deleted.insert(*user_id);

        let outgoing = edges.by_follower.remove(user_id).unwrap_or_default();
        let incoming = edges.by_followed.remove(user_id).unwrap_or_default();

        for followed_id in outgoing.keys() {
            remove_from(&mut edges.by_followed, followed_id, user_id);
        }

        for follower_id in incoming.keys() {
            remove_from(&mut edges.by_follower, follower_id, user_id);
        }

        Ok(outgoing.len() + incoming.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn edge(follower: UserId, followed: UserId) -> FollowRelationship {
        FollowRelationship::new(follower, followed).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_exists() {
        let repo = InMemoryFollowRepository::new();
        let (a, b) = (UserId::generate(), UserId::generate());

        assert!(!repo.exists(&a, &b).await.unwrap());

        assert!(repo.insert(edge(a, b)).await.unwrap());

        assert!(repo.exists(&a, &b).await.unwrap());
        assert!(!repo.exists(&b, &a).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert() {
        let repo = InMemoryFollowRepository::new();
        let (a, b) = (UserId::generate(), UserId::generate());

        assert!(repo.insert(edge(a, b)).await.unwrap());
        assert!(!repo.insert(edge(a, b)).await.unwrap());

        assert_eq!(repo.following(&a).await.unwrap(), vec![b]);
        assert_eq!(repo.followers(&b).await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn test_remove() {
        let repo = InMemoryFollowRepository::new();
        let (a, b) = (UserId::generate(), UserId::generate());

        repo.insert(edge(a, b)).await.unwrap();

        assert!(repo.remove(&a, &b).await.unwrap());
        assert!(!repo.exists(&a, &b).await.unwrap());
        assert!(repo.followers(&b).await.unwrap().is_empty());

        // Second remove is a no-op
        assert!(!repo.remove(&a, &b).await.unwrap());
    }

    #[tokio::test]
    async fn test_counts() {
        let repo = InMemoryFollowRepository::new();
        let (a, b, c) = (UserId::generate(), UserId::generate(), UserId::generate());

        repo.insert(edge(a, b)).await.unwrap();
        repo.insert(edge(a, c)).await.unwrap();
        repo.insert(edge(c, a)).await.unwrap();

        assert_eq!(repo.count_following(&a).await.unwrap(), 2);
        assert_eq!(repo.count_followers(&a).await.unwrap(), 1);
        assert_eq!(repo.count_followers(&b).await.unwrap(), 1);
        assert_eq!(repo.count_following(&b).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_all_for() {
        let repo = InMemoryFollowRepository::new();
        let (a, b, c) = (UserId::generate(), UserId::generate(), UserId::generate());

        repo.insert(edge(a, b)).await.unwrap();
        repo.insert(edge(b, a)).await.unwrap();
        repo.insert(edge(c, a)).await.unwrap();
        repo.insert(edge(b, c)).await.unwrap();

        assert_eq!(repo.remove_all_for(&a).await.unwrap(), 3);

        assert!(repo.following(&a).await.unwrap().is_empty());
        assert!(repo.followers(&a).await.unwrap().is_empty());
        assert_eq!(repo.following(&b).await.unwrap(), vec![c]);
        assert!(repo.following(&c).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listings_follow_insertion_order() {
        let repo = InMemoryFollowRepository::new();
        let a = UserId::generate();
        let others: Vec<UserId> = (0..8).map(|_| UserId::generate()).collect();

        for other in &others {
            repo.insert(edge(a, *other)).await.unwrap();
            repo.insert(edge(*other, a)).await.unwrap();
        }

        assert_eq!(repo.following(&a).await.unwrap(), others);
        assert_eq!(repo.followers(&a).await.unwrap(), others);

        // Re-following keeps the original position
        repo.insert(edge(a, others[0])).await.unwrap();
        assert_eq!(repo.following(&a).await.unwrap()[0], others[0]);

        // Unfollow then follow moves the edge to the end
        repo.remove(&a, &others[0]).await.unwrap();
        repo.insert(edge(a, others[0])).await.unwrap();
        assert_eq!(repo.following(&a).await.unwrap().last(), Some(&others[0]));
    }

    #[tokio::test]
    async fn test_insert_after_remove_all_for_is_rejected() {
        let repo = InMemoryFollowRepository::new();
        let (a, b) = (UserId::generate(), UserId::generate());

        repo.remove_all_for(&b).await.unwrap();

        let result = repo.insert(edge(a, b)).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));

        let result = repo.insert(edge(b, a)).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));

        assert_eq!(repo.count_following(&a).await.unwrap(), 0);
        assert_eq!(repo.count_followers(&a).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_follow_unfollow_keeps_indexes_consistent() {
        let repo = Arc::new(InMemoryFollowRepository::new());
        let (a, b) = (UserId::generate(), UserId::generate());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        repo.insert(edge(a, b)).await.map(|_| ())
                    } else {
                        repo.remove(&a, &b).await.map(|_| ())
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let forward = repo.exists(&a, &b).await.unwrap();
        let backward = repo.followers(&b).await.unwrap().contains(&a);
        assert_eq!(forward, backward);
    }
}
