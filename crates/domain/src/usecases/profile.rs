//! Profile composition use case - derives every profile field from one snapshot

use std::sync::Arc;
use thiserror::Error;

use crate::{
    model::{
        ActivitySnapshot, BadgeTally, LeaderboardEntry, PopulationMember, ProfileSnapshot,
        ProfileUser, StatisticsReport, TopPostEntry, TopTagEntry, UserAccount, UserRef,
        UserStatistics, VoteTally,
    },
    policy::LimitPolicy,
    ports::{ActivityStore, Clock, StoreError},
    usecases::{
        badges::{BadgeCounters, compute_badges, earned_badges},
        rank::ScoreIndex,
        top_k::{top_posts, top_tags},
    },
};
use time::OffsetDateTime;

/// Errors surfaced to callers of the profile service
#[derive(Debug, Error)]
pub enum EngineError {
    /// The user does not exist, as opposed to existing with no activity
    #[error("User not found: {0}")]
    UserNotFound(UserRef),
    #[error("Activity store unavailable: {0}")]
    UpstreamUnavailable(#[from] StoreError),
}

/// Configuration for the profile service
#[derive(Debug, Clone, Default)]
pub struct ProfileConfig {
    pub limits: LimitPolicy,
}

/// Statistics for the snapshot's user
pub fn derive_statistics(snapshot: &ActivitySnapshot) -> UserStatistics {
    let tally = VoteTally::from_records(&snapshot.questions, &snapshot.answers);
    let reputation = tally.reputation();
    let total_views = snapshot
        .questions
        .iter()
        .fold(0u64, |sum, q| sum.saturating_add(q.view_count));
    let global_rank = ScoreIndex::new(snapshot.population_scores.clone()).rank_of(reputation);

    UserStatistics {
        reputation,
        global_rank,
        accepted_answers: tally.accepted_answers,
        total_answers: snapshot.answers.len() as u64,
        total_questions: snapshot.questions.len() as u64,
        total_views,
        impact: total_views,
    }
}

fn badge_names(counters: &BadgeCounters) -> Vec<String> {
    earned_badges(counters)
        .into_iter()
        .map(|rule| rule.name.to_string())
        .collect()
}

/// Build a full profile from one snapshot
pub fn compose(
    snapshot: &ActivitySnapshot,
    limits: &LimitPolicy,
    computed_at: OffsetDateTime,
) -> ProfileSnapshot {
    let statistics = derive_statistics(snapshot);
    let counters = BadgeCounters::from(&statistics);

    ProfileSnapshot {
        user: ProfileUser::from(&snapshot.user),
        statistics,
        badges: compute_badges(&counters),
        earned_badges: badge_names(&counters),
        top_tags: top_tags(&snapshot.questions, limits.profile_tags()),
        top_posts: top_posts(&snapshot.questions, limits.profile_posts()),
        consistency: snapshot.consistency,
        fingerprint: snapshot.fingerprint(),
        computed_at,
    }
}

impl PopulationMember {
    pub fn reputation(&self) -> u64 {
        self.tally.reputation()
    }

    pub fn badge_counters(&self) -> BadgeCounters {
        BadgeCounters {
            reputation: self.reputation(),
            accepted_answers: self.tally.accepted_answers,
            question_count: self.question_count,
            answer_count: self.answer_count,
            total_views: self.total_views,
        }
    }
}

/// Rank a whole population; ties share a rank and are listed by username, then ID
pub fn rank_population(members: &[PopulationMember], limit: usize) -> Vec<LeaderboardEntry> {
    let index: ScoreIndex = members.iter().map(|m| m.reputation()).collect();

    let mut entries: Vec<LeaderboardEntry> = members
        .iter()
        .map(|member| {
            let reputation = member.reputation();
            LeaderboardEntry {
                rank: index.rank_of(reputation),
                user_id: member.user.id.clone(),
                username: member.user.username.clone(),
                reputation,
                badges: compute_badges(&member.badge_counters()),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.username.cmp(&b.username))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    entries.truncate(limit);
    entries
}

/// Profile service: resolves users, takes snapshots, runs the derivations
pub struct ProfileService<S, Cl>
where
    S: ActivityStore + ?Sized,
    Cl: Clock + ?Sized,
{
    store: Arc<S>,
    clock: Arc<Cl>,
    config: ProfileConfig,
}

impl<S, Cl> ProfileService<S, Cl>
where
    S: ActivityStore + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(store: Arc<S>, clock: Arc<Cl>, config: ProfileConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Resolve an ID or `@username` reference to an account
    pub async fn resolve(&self, user: &UserRef) -> Result<UserAccount, EngineError> {
        let found = match user {
            UserRef::Id(id) => self.store.find_user(id).await?,
            UserRef::Username(username) => self.store.find_user_by_username(username).await?,
        };
        found.ok_or_else(|| EngineError::UserNotFound(user.clone()))
    }

    async fn load_snapshot(&self, user: &UserRef) -> Result<ActivitySnapshot, EngineError> {
        let account = self.resolve(user).await?;
        let snapshot = self
            .store
            .snapshot(&account.id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user.clone()))?;

        tracing::debug!(
            user_id = %account.id,
            questions = snapshot.questions.len(),
            answers = snapshot.answers.len(),
            population = snapshot.population_scores.len(),
            consistency = ?snapshot.consistency,
            "Loaded activity snapshot"
        );

        Ok(snapshot)
    }

    /// Full profile: statistics, badges, top tags and top posts from one snapshot
    pub async fn compose_profile(&self, user: &UserRef) -> Result<ProfileSnapshot, EngineError> {
        let snapshot = self.load_snapshot(user).await?;
        let profile = compose(&snapshot, &self.config.limits, self.clock.now());

        tracing::info!(
            user_id = %profile.user.id,
            reputation = profile.statistics.reputation,
            global_rank = profile.statistics.global_rank,
            gold = profile.badges.gold,
            silver = profile.badges.silver,
            bronze = profile.badges.bronze,
            "Composed profile"
        );

        Ok(profile)
    }

    /// Statistics and badges without the top-K listings
    pub async fn statistics(&self, user: &UserRef) -> Result<StatisticsReport, EngineError> {
        let snapshot = self.load_snapshot(user).await?;
        let statistics = derive_statistics(&snapshot);
        let counters = BadgeCounters::from(&statistics);

        Ok(StatisticsReport {
            statistics,
            badges: compute_badges(&counters),
            earned_badges: badge_names(&counters),
            consistency: snapshot.consistency,
        })
    }

    pub async fn reputation(&self, user: &UserRef) -> Result<u64, EngineError> {
        let snapshot = self.load_snapshot(user).await?;
        Ok(derive_statistics(&snapshot).reputation)
    }

    pub async fn global_rank(&self, user: &UserRef) -> Result<u64, EngineError> {
        let snapshot = self.load_snapshot(user).await?;
        Ok(derive_statistics(&snapshot).global_rank)
    }

    pub async fn badges(&self, user: &UserRef) -> Result<BadgeTally, EngineError> {
        Ok(self.statistics(user).await?.badges)
    }

    /// Most used tags; only the user's questions are read
    pub async fn top_tags(
        &self,
        user: &UserRef,
        limit: Option<usize>,
    ) -> Result<Vec<TopTagEntry>, EngineError> {
        let account = self.resolve(user).await?;
        let questions = self.store.fetch_questions(&account.id).await?;
        Ok(top_tags(&questions, self.config.limits.top_tags(limit)))
    }

    /// Highest voted questions; only the user's questions are read
    pub async fn top_posts(
        &self,
        user: &UserRef,
        limit: Option<usize>,
    ) -> Result<Vec<TopPostEntry>, EngineError> {
        let account = self.resolve(user).await?;
        let questions = self.store.fetch_questions(&account.id).await?;
        Ok(top_posts(&questions, self.config.limits.top_posts(limit)))
    }

    /// Population ranking from one read of every user's aggregates
    pub async fn leaderboard(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<LeaderboardEntry>, EngineError> {
        let members = self.store.fetch_population().await?;
        let limit = self.config.limits.leaderboard(limit);

        tracing::info!(population = members.len(), limit, "Ranking population");

        Ok(rank_population(&members, limit))
    }
}
