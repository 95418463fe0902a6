//! Top-tags and top-posts commands

use anyhow::Result;
use reputation_engine_domain::UserRef;

use super::profile::{print_posts, print_tags};
use super::{Context, build_service, print_json};
use crate::args::TopArgs;

pub async fn execute_tags(args: TopArgs, ctx: &Context) -> Result<()> {
    let service = build_service(ctx).await?;
    let tags = service
        .top_tags(&UserRef::parse(&args.user), args.limit)
        .await?;

    if args.json {
        return print_json(&tags);
    }

    print_tags(&tags);
    Ok(())
}

pub async fn execute_posts(args: TopArgs, ctx: &Context) -> Result<()> {
    let service = build_service(ctx).await?;
    let posts = service
        .top_posts(&UserRef::parse(&args.user), args.limit)
        .await?;

    if args.json {
        return print_json(&posts);
    }

    print_posts(&posts);
    Ok(())
}
