//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// A registered user, as far as the engine needs to know about one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Store-assigned user ID
    pub id: String,
    /// Unique handle used in shareable profile references (`@username`)
    pub username: String,
    /// Optional display name
    #[serde(default)]
    pub display_name: Option<String>,
    /// When the account was created
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A question authored by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub author_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub upvote_count: u64,
    #[serde(default)]
    pub downvote_count: u64,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    /// Tag names attached to the question
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_solved: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A top-level answer to a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: String,
    pub author_id: String,
    pub question_id: String,
    #[serde(default)]
    pub upvote_count: u64,
    #[serde(default)]
    pub downvote_count: u64,
    #[serde(default)]
    pub is_accepted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Reference to a user, either by store ID or by `@username`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserRef {
    Id(String),
    Username(String),
}

impl UserRef {
    /// Parse a CLI/API style reference: `@name` is a username, anything else an ID
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.strip_prefix('@') {
            Some(username) => Self::Username(username.to_string()),
            None => Self::Id(raw.to_string()),
        }
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Username(username) => write!(f, "@{}", username),
        }
    }
}

/// Summed vote and acceptance counts for one user's activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub question_upvotes: u64,
    pub question_downvotes: u64,
    pub answer_upvotes: u64,
    pub answer_downvotes: u64,
    pub accepted_answers: u64,
}

/// A user together with the aggregates needed to rank and badge them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationMember {
    pub user: UserAccount,
    pub tally: VoteTally,
    pub question_count: u64,
    pub answer_count: u64,
    pub total_views: u64,
}

/// How strongly the reads behind a snapshot agree with each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    /// All reads were served from one point-in-time view of the store
    PointInTime,
    /// Reads were issued separately; concurrent writes may be partially visible
    BestEffort,
}

/// Everything one profile composition is derived from
#[derive(Debug, Clone)]
pub struct ActivitySnapshot {
    pub user: UserAccount,
    pub questions: Vec<QuestionRecord>,
    pub answers: Vec<AnswerRecord>,
    /// Reputation of every registered user, including `user`
    pub population_scores: Vec<u64>,
    pub consistency: Consistency,
}

impl ActivitySnapshot {
    /// Content fingerprint of the activity this snapshot holds
    pub fn fingerprint(&self) -> String {
        crate::compute_activity_fingerprint(
            &self.user.id,
            &self.questions,
            &self.answers,
            &self.population_scores,
        )
    }
}

/// Badge counts per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeTally {
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
}

impl BadgeTally {
    pub fn total(&self) -> u32 {
        self.gold + self.silver + self.bronze
    }
}

/// A tag and how many of the user's questions carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTagEntry {
    pub name: String,
    pub count: u64,
}

/// Read-only projection of a question for the top-posts listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPostEntry {
    pub id: String,
    pub title: String,
    pub upvotes: u64,
    pub views: u64,
    pub replies: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub solved: bool,
}

/// Derived per-user statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub reputation: u64,
    pub global_rank: u64,
    pub accepted_answers: u64,
    pub total_answers: u64,
    pub total_questions: u64,
    pub total_views: u64,
    /// Total views on the user's questions
    pub impact: u64,
}

/// Public identity shown alongside a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUser {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_date: OffsetDateTime,
}

impl From<&UserAccount> for ProfileUser {
    fn from(user: &UserAccount) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            joined_date: user.created_at,
        }
    }
}

/// A complete profile, every field derived from one activity snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub user: ProfileUser,
    #[serde(flatten)]
    pub statistics: UserStatistics,
    pub badges: BadgeTally,
    /// Names of the badges behind `badges`, in rule table order
    pub earned_badges: Vec<String>,
    pub top_tags: Vec<TopTagEntry>,
    pub top_posts: Vec<TopPostEntry>,
    pub consistency: Consistency,
    /// SHA-256 over the activity the profile was derived from
    pub fingerprint: String,
    #[serde(with = "time::serde::rfc3339")]
    pub computed_at: OffsetDateTime,
}

/// Statistics plus badges, without the top-K listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub statistics: UserStatistics,
    pub badges: BadgeTally,
    pub earned_badges: Vec<String>,
    pub consistency: Consistency,
}

/// One row of the population ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u64,
    pub user_id: String,
    pub username: String,
    pub reputation: u64,
    pub badges: BadgeTally,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_ref_parse() {
        assert_eq!(UserRef::parse("@alice"), UserRef::Username("alice".to_string()));
        assert_eq!(UserRef::parse(" u-42 "), UserRef::Id("u-42".to_string()));
        assert_eq!(UserRef::parse("@alice").to_string(), "@alice");
    }

    #[test]
    fn test_profile_snapshot_flattens_statistics() {
        let created_at = OffsetDateTime::UNIX_EPOCH;
        let snapshot = ProfileSnapshot {
            user: ProfileUser {
                id: "u1".to_string(),
                username: "alice".to_string(),
                display_name: None,
                joined_date: created_at,
            },
            statistics: UserStatistics {
                reputation: 120,
                global_rank: 3,
                ..Default::default()
            },
            badges: BadgeTally::default(),
            earned_badges: vec![],
            top_tags: vec![],
            top_posts: vec![],
            consistency: Consistency::PointInTime,
            fingerprint: "abc".to_string(),
            computed_at: created_at,
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["reputation"], 120);
        assert_eq!(value["global_rank"], 3);
        assert_eq!(value["consistency"], "point_in_time");
        assert!(value.get("statistics").is_none());
    }
}
