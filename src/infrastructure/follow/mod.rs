//! Follow graph infrastructure module

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresFollowRepository;
pub use repository::InMemoryFollowRepository;
pub use service::FollowService;
