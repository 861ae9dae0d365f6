//! Migrate command - applies the PostgreSQL schema

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::storage::{connect, run_migrations, PostgresMigrator, StorageType};

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    if config.storage.backend != StorageType::Postgres {
        anyhow::bail!("migrate requires storage.backend = \"postgres\"");
    }

    let pool = connect(&config.storage.postgres).await?;

    let applied = run_migrations(&pool).await?;
    let version = PostgresMigrator::new(pool).current_version().await?;

    info!(applied, ?version, "Migrations complete");
    println!(
        "Applied {} migration(s); schema at version {}",
        applied,
        version.unwrap_or(0)
    );

    Ok(())
}
