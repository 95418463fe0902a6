//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{
    ActivitySnapshot, AnswerRecord, Consistency, PopulationMember, QuestionRecord, UserAccount,
};

/// Error type for activity store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for reading users and their activity
///
/// Implementations only filter; they never derive scores themselves except
/// through the domain's `VoteTally`.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Look up a user by store ID
    async fn find_user(&self, user_id: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Look up a user by username, ignoring ASCII case
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError>;

    /// Non-deleted questions authored by the user
    async fn fetch_questions(&self, user_id: &str) -> Result<Vec<QuestionRecord>, StoreError>;

    /// Non-deleted top-level answers authored by the user
    async fn fetch_answers(&self, user_id: &str) -> Result<Vec<AnswerRecord>, StoreError>;

    /// Reputation of every registered user, one entry per user
    async fn fetch_all_user_reputation_scores(&self) -> Result<Vec<u64>, StoreError>;

    /// Every registered user with their activity aggregates
    async fn fetch_population(&self) -> Result<Vec<PopulationMember>, StoreError>;

    /// Read everything a profile needs for one user in a single read boundary.
    ///
    /// The default issues the individual reads one after another and marks the
    /// result `BestEffort`. Stores with snapshot isolation should override it.
    async fn snapshot(&self, user_id: &str) -> Result<Option<ActivitySnapshot>, StoreError> {
        let Some(user) = self.find_user(user_id).await? else {
            return Ok(None);
        };

        tracing::warn!(
            user_id = %user_id,
            "Store has no snapshot support, composing from separate reads"
        );

        let questions = self.fetch_questions(user_id).await?;
        let answers = self.fetch_answers(user_id).await?;
        let population_scores = self.fetch_all_user_reputation_scores().await?;

        Ok(Some(ActivitySnapshot {
            user,
            questions,
            answers,
            population_scores,
            consistency: Consistency::BestEffort,
        }))
    }
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
