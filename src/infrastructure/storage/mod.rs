//! Storage infrastructure - backend selection, pooling and schema

mod factory;
pub mod migrations;
mod postgres;

pub use factory::{Repositories, StorageConfig, StorageFactory, StorageType};
pub use migrations::{account_migrations, run_migrations, Migration, PostgresMigrator};
pub use postgres::{connect, PostgresConfig};
