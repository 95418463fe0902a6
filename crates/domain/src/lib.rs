//! reputation-engine domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Reputation, rank, badge and top-K derivations plus the profile service
//! - `policy`: Result size limits

pub mod model;
pub mod policy;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;

use sha2::{Digest, Sha256};

/// Compute a deterministic hash of the activity a profile is derived from.
/// Record order does not matter; any change to a counted field does.
pub fn compute_activity_fingerprint(
    user_id: &str,
    questions: &[QuestionRecord],
    answers: &[AnswerRecord],
    population_scores: &[u64],
) -> String {
    let mut questions: Vec<_> = questions.iter().collect();
    questions.sort_by(|a, b| a.id.cmp(&b.id));
    let mut answers: Vec<_> = answers.iter().collect();
    answers.sort_by(|a, b| a.id.cmp(&b.id));
    let mut scores = population_scores.to_vec();
    scores.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());

    for q in questions {
        hasher.update(b"q");
        hasher.update(q.id.as_bytes());
        hasher.update([0]);
        hasher.update(q.title.as_bytes());
        hasher.update([0]);
        hasher.update(q.upvote_count.to_le_bytes());
        hasher.update(q.downvote_count.to_le_bytes());
        hasher.update(q.view_count.to_le_bytes());
        hasher.update(q.reply_count.to_le_bytes());
        hasher.update([q.is_solved as u8]);
        hasher.update(q.created_at.unix_timestamp().to_le_bytes());
        for tag in &q.tags {
            hasher.update(tag.as_bytes());
            hasher.update([0]);
        }
    }

    for a in answers {
        hasher.update(b"a");
        hasher.update(a.id.as_bytes());
        hasher.update([0]);
        hasher.update(a.question_id.as_bytes());
        hasher.update([0]);
        hasher.update(a.upvote_count.to_le_bytes());
        hasher.update(a.downvote_count.to_le_bytes());
        hasher.update([a.is_accepted as u8]);
    }

    hasher.update(b"p");
    for score in scores {
        hasher.update(score.to_le_bytes());
    }

    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn question(id: &str, upvotes: u64) -> QuestionRecord {
        QuestionRecord {
            id: id.to_string(),
            author_id: "u1".to_string(),
            title: format!("Question {}", id),
            upvote_count: upvotes,
            downvote_count: 0,
            view_count: 10,
            reply_count: 1,
            tags: vec!["rust".to_string()],
            is_solved: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_fingerprint_ignores_record_order() {
        let a = [question("q1", 1), question("q2", 2)];
        let b = [question("q2", 2), question("q1", 1)];

        assert_eq!(
            compute_activity_fingerprint("u1", &a, &[], &[10, 20]),
            compute_activity_fingerprint("u1", &b, &[], &[20, 10])
        );
    }

    #[test]
    fn test_fingerprint_changes_with_votes() {
        let before = [question("q1", 1)];
        let after = [question("q1", 2)];

        assert_ne!(
            compute_activity_fingerprint("u1", &before, &[], &[10]),
            compute_activity_fingerprint("u1", &after, &[], &[10])
        );
    }

    #[test]
    fn test_fingerprint_changes_with_population() {
        let questions = [question("q1", 1)];

        assert_ne!(
            compute_activity_fingerprint("u1", &questions, &[], &[10]),
            compute_activity_fingerprint("u1", &questions, &[], &[10, 30])
        );
    }
}
