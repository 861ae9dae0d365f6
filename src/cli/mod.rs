//! CLI module for Account Graph
//!
//! Operator commands against the configured storage backend:
//! - `migrate`: apply the PostgreSQL schema
//! - `signup` / `login` / `delete`: account management
//! - `follow` / `unfollow` / `show`: the follow graph

pub mod account;
pub mod graph;
pub mod migrate;

use clap::{Args, Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::{DomainError, User};
use crate::infrastructure::logging;
use crate::infrastructure::storage::StorageType;
use crate::{create_services, AppServices};

/// Account Graph - user accounts and follow relationships
#[derive(Parser)]
#[command(name = "account-graph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply pending database migrations
    Migrate,

    /// Create a user
    Signup(account::SignupArgs),

    /// Check a user's password
    Login(account::LoginArgs),

    /// Delete a user and their follow relationships
    Delete(EmailArg),

    /// Follow another user
    Follow(graph::PairArgs),

    /// Stop following another user
    Unfollow(graph::PairArgs),

    /// Show a user's profile and follow graph
    Show(graph::ShowArgs),
}

#[derive(Args)]
pub struct EmailArg {
    /// Email of the user
    #[arg(long)]
    pub email: String,
}

/// Load configuration, initialise logging, and run `command`
pub async fn run(command: Command) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    match command {
        Command::Migrate => migrate::run(&config).await,
        other => run_with_services(&config, other).await,
    }
}

async fn run_with_services(config: &AppConfig, command: Command) -> anyhow::Result<()> {
    if config.storage.backend == StorageType::Memory {
        warn!("Using in-memory storage; nothing persists past this command");
    }

    let services = create_services(config).await?;

    match command {
        Command::Migrate => migrate::run(config).await,
        Command::Signup(args) => account::signup(&services, args).await,
        Command::Login(args) => account::login(&services, args).await,
        Command::Delete(args) => account::delete(&services, args).await,
        Command::Follow(args) => graph::follow(&services, args).await,
        Command::Unfollow(args) => graph::unfollow(&services, args).await,
        Command::Show(args) => graph::show(&services, args).await,
    }
}

/// Resolve a user by email or fail with a readable message
pub(crate) async fn require_user(services: &AppServices, email: &str) -> anyhow::Result<User> {
    services
        .users
        .find_by_email(email)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("No user with email '{}'", email)).into())
}
