//! Follow graph commands

use clap::Args;

use crate::domain::{FollowControl, User};
use crate::AppServices;

use super::require_user;

#[derive(Args)]
pub struct PairArgs {
    /// Email of the acting user
    #[arg(long)]
    pub follower: String,

    /// Email of the user being (un)followed
    #[arg(long)]
    pub followed: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Email of the profile to show
    #[arg(long)]
    pub email: String,

    /// Show the follow button as this user would see it
    #[arg(long)]
    pub viewer: Option<String>,
}

pub async fn follow(services: &AppServices, args: PairArgs) -> anyhow::Result<()> {
    let follower = require_user(services, &args.follower).await?;
    let followed = require_user(services, &args.followed).await?;

    services.follows.follow(follower.id(), followed.id()).await?;
    println!("{} now follows {}", follower.name(), followed.name());

    Ok(())
}

pub async fn unfollow(services: &AppServices, args: PairArgs) -> anyhow::Result<()> {
    let follower = require_user(services, &args.follower).await?;
    let followed = require_user(services, &args.followed).await?;

    services.follows.unfollow(follower.id(), followed.id()).await?;
    println!("{} no longer follows {}", follower.name(), followed.name());

    Ok(())
}

pub async fn show(services: &AppServices, args: ShowArgs) -> anyhow::Result<()> {
    let user = require_user(services, &args.email).await?;
    let counts = services.follows.counts(user.id()).await?;

    println!("{} <{}>", user.name(), user.email());
    println!("  following: {}", counts.following);
    println!("  followers: {}", counts.followers);

    print_list("following", &services.follows.following(user.id()).await?);
    print_list("followers", &services.follows.followers(user.id()).await?);

    if let Some(viewer_email) = args.viewer {
        let viewer = require_user(services, &viewer_email).await?;
        let control = services.follows.follow_control(viewer.id(), user.id()).await?;

        let label = match control {
            FollowControl::Hidden => "(own profile)",
            FollowControl::Follow => "[Follow]",
            FollowControl::Unfollow => "[Unfollow]",
        };
        println!("  button for {}: {}", viewer.name(), label);
    }

    Ok(())
}

fn print_list(title: &str, users: &[User]) {
    if users.is_empty() {
        return;
    }

    println!("  {}:", title);
    for user in users {
        println!("    - {} <{}>", user.name(), user.email());
    }
}
