//! Application use cases / business logic

pub mod badges;
pub mod profile;
pub mod rank;
pub mod reputation;
pub mod top_k;

pub use badges::{
    BADGE_RULES, BadgeCounters, BadgeMetric, BadgeRule, BadgeTier, compute_badges, earned_badges,
};
pub use profile::{
    EngineError, ProfileConfig, ProfileService, compose, derive_statistics, rank_population,
};
pub use rank::{ScoreIndex, compute_global_rank};
pub use reputation::compute_reputation;
pub use top_k::{top_posts, top_tags};
