//! Profile and stats commands

use anyhow::Result;
use reputation_engine_domain::{
    BadgeTally, Consistency, ProfileSnapshot, StatisticsReport, TopPostEntry, TopTagEntry,
    UserRef, UserStatistics,
};

use super::{Context, build_service, print_json};
use crate::args::UserArgs;

pub async fn execute_profile(args: UserArgs, ctx: &Context) -> Result<()> {
    let service = build_service(ctx).await?;
    let profile = service.compose_profile(&UserRef::parse(&args.user)).await?;

    if args.json {
        return print_json(&profile);
    }

    print_profile(&profile);
    Ok(())
}

pub async fn execute_stats(args: UserArgs, ctx: &Context) -> Result<()> {
    let service = build_service(ctx).await?;
    let report = service.statistics(&UserRef::parse(&args.user)).await?;

    if args.json {
        return print_json(&report);
    }

    print_report(&report);
    Ok(())
}

fn print_profile(profile: &ProfileSnapshot) {
    let user = &profile.user;
    match &user.display_name {
        Some(name) => println!("{} (@{})", name, user.username),
        None => println!("@{}", user.username),
    }
    println!("{}", "=".repeat(user.username.len() + 1));
    println!("Joined: {}", user.joined_date.date());
    println!();

    print_statistics(&profile.statistics);
    print_badges(&profile.badges, &profile.earned_badges);
    println!();

    print_tags(&profile.top_tags);
    println!();
    print_posts(&profile.top_posts);

    if profile.consistency == Consistency::BestEffort {
        println!();
        println!("Note: figures were read without a consistent snapshot");
    }
}

fn print_report(report: &StatisticsReport) {
    print_statistics(&report.statistics);
    print_badges(&report.badges, &report.earned_badges);
}

fn print_statistics(stats: &UserStatistics) {
    println!("Reputation:       {}", stats.reputation);
    println!("Global rank:      #{}", stats.global_rank);
    println!("Questions:        {}", stats.total_questions);
    println!("Answers:          {}", stats.total_answers);
    println!("Accepted answers: {}", stats.accepted_answers);
    println!("Views:            {}", stats.total_views);
    println!("Impact:           {}", stats.impact);
}

fn print_badges(badges: &BadgeTally, earned: &[String]) {
    println!(
        "Badges:           {} ({} gold, {} silver, {} bronze)",
        badges.total(),
        badges.gold,
        badges.silver,
        badges.bronze
    );
    if !earned.is_empty() {
        println!("                  {}", earned.join(", "));
    }
}

pub(crate) fn print_tags(tags: &[TopTagEntry]) {
    if tags.is_empty() {
        println!("No tags yet.");
        return;
    }

    println!("Top tags:");
    for tag in tags {
        println!("  {:<24} {}", tag.name, tag.count);
    }
}

pub(crate) fn print_posts(posts: &[TopPostEntry]) {
    if posts.is_empty() {
        println!("No questions yet.");
        return;
    }

    println!("Top posts:");
    for post in posts {
        let solved = if post.solved { " [solved]" } else { "" };
        println!("  {}{}", post.title, solved);
        println!(
            "    id: {}, upvotes: {}, views: {}, replies: {}, asked: {}",
            post.id,
            post.upvotes,
            post.views,
            post.replies,
            post.created_at.date()
        );
    }
}
