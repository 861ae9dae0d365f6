//! User infrastructure module
//!
//! Password hashing with Argon2, remember-token digests, in-memory and
//! PostgreSQL repositories, and the user service.

mod password;
mod postgres_repository;
mod repository;
mod service;
mod token;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{CreateUserRequest, UpdatePasswordRequest, UserService};
pub use token::{IssuedToken, TokenDigester, MIN_TOKEN_BYTES};
