//! Leaderboard command - rank every user by reputation

use anyhow::Result;

use super::{Context, build_service, print_json};
use crate::args::LeaderboardArgs;

pub async fn execute(args: LeaderboardArgs, ctx: &Context) -> Result<()> {
    let service = build_service(ctx).await?;
    let entries = service.leaderboard(args.limit).await?;

    if args.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No users.");
        return Ok(());
    }

    println!("{:>5}  {:<24} {:>10}  Badges (G/S/B)", "Rank", "User", "Reputation");
    for entry in &entries {
        println!(
            "{:>5}  {:<24} {:>10}  {}/{}/{}",
            entry.rank,
            format!("@{}", entry.username),
            entry.reputation,
            entry.badges.gold,
            entry.badges.silver,
            entry.badges.bronze
        );
    }

    Ok(())
}
