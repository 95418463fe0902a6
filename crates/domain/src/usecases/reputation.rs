//! Reputation calculation

use crate::model::{AnswerRecord, QuestionRecord, VoteTally};

/// Points for each upvote on a question or answer
pub const UPVOTE_POINTS: u64 = 10;
/// Points removed for each downvote on a question or answer
pub const DOWNVOTE_PENALTY: u64 = 2;
/// Bonus for each accepted answer
pub const ACCEPTED_ANSWER_BONUS: u64 = 15;

impl VoteTally {
    /// Fold a user's questions and answers into a tally
    pub fn from_records(questions: &[QuestionRecord], answers: &[AnswerRecord]) -> Self {
        let mut tally = Self::default();
        for q in questions {
            tally.question_upvotes = tally.question_upvotes.saturating_add(q.upvote_count);
            tally.question_downvotes = tally.question_downvotes.saturating_add(q.downvote_count);
        }
        for a in answers {
            tally.answer_upvotes = tally.answer_upvotes.saturating_add(a.upvote_count);
            tally.answer_downvotes = tally.answer_downvotes.saturating_add(a.downvote_count);
            if a.is_accepted {
                tally.accepted_answers = tally.accepted_answers.saturating_add(1);
            }
        }
        tally
    }

    /// Combine two tallies
    pub fn merge(self, other: Self) -> Self {
        Self {
            question_upvotes: self.question_upvotes.saturating_add(other.question_upvotes),
            question_downvotes: self
                .question_downvotes
                .saturating_add(other.question_downvotes),
            answer_upvotes: self.answer_upvotes.saturating_add(other.answer_upvotes),
            answer_downvotes: self.answer_downvotes.saturating_add(other.answer_downvotes),
            accepted_answers: self.accepted_answers.saturating_add(other.accepted_answers),
        }
    }

    /// Reputation earned by this tally, never below zero
    pub fn reputation(&self) -> u64 {
        let earned = self
            .question_upvotes
            .saturating_add(self.answer_upvotes)
            .saturating_mul(UPVOTE_POINTS)
            .saturating_add(self.accepted_answers.saturating_mul(ACCEPTED_ANSWER_BONUS));
        let lost = self
            .question_downvotes
            .saturating_add(self.answer_downvotes)
            .saturating_mul(DOWNVOTE_PENALTY);
        earned.saturating_sub(lost)
    }
}

/// Reputation for a user's questions and answers
pub fn compute_reputation(questions: &[QuestionRecord], answers: &[AnswerRecord]) -> u64 {
    VoteTally::from_records(questions, answers).reputation()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn question(upvotes: u64, downvotes: u64) -> QuestionRecord {
        QuestionRecord {
            id: format!("q-{}-{}", upvotes, downvotes),
            author_id: "u1".to_string(),
            title: "How do lifetimes work?".to_string(),
            upvote_count: upvotes,
            downvote_count: downvotes,
            view_count: 0,
            reply_count: 0,
            tags: vec![],
            is_solved: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn answer(upvotes: u64, downvotes: u64, accepted: bool) -> AnswerRecord {
        AnswerRecord {
            id: format!("a-{}-{}-{}", upvotes, downvotes, accepted),
            author_id: "u1".to_string(),
            question_id: "q0".to_string(),
            upvote_count: upvotes,
            downvote_count: downvotes,
            is_accepted: accepted,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_empty_activity_is_zero() {
        assert_eq!(compute_reputation(&[], &[]), 0);
    }

    #[test]
    fn test_weights() {
        // 5 up, 1 down on a question: 50 - 2
        assert_eq!(compute_reputation(&[question(5, 1)], &[]), 48);
        // accepted answer with 2 up: 20 + 15
        assert_eq!(compute_reputation(&[], &[answer(2, 0, true)]), 35);
        assert_eq!(
            compute_reputation(&[question(5, 1)], &[answer(2, 0, true), answer(0, 3, false)]),
            77
        );
    }

    #[test]
    fn test_never_negative() {
        assert_eq!(compute_reputation(&[question(0, 5)], &[]), 0);
        assert_eq!(compute_reputation(&[question(1, 100)], &[answer(0, 9, false)]), 0);
    }

    #[test]
    fn test_penalty_is_netted_across_records() {
        // downvotes on one record cancel upvotes on another before clamping
        assert_eq!(compute_reputation(&[question(0, 5), question(2, 0)], &[]), 10);
    }

    #[test]
    fn test_monotonic_in_upvotes_and_acceptance() {
        for downvotes in [0, 3, 50] {
            let mut previous = 0;
            for upvotes in 0..30 {
                let score = compute_reputation(&[question(upvotes, downvotes)], &[]);
                assert!(score >= previous);
                previous = score;
            }
        }

        let plain = compute_reputation(&[], &[answer(1, 4, false)]);
        let accepted = compute_reputation(&[], &[answer(1, 4, true)]);
        assert!(accepted >= plain);
    }

    #[test]
    fn test_saturates_instead_of_overflowing() {
        let huge = question(u64::MAX, 0);
        assert_eq!(compute_reputation(&[huge.clone(), huge], &[]), u64::MAX);
    }

    #[test]
    fn test_merge_matches_combined_fold() {
        let questions = [question(3, 1), question(0, 2)];
        let answers = [answer(4, 0, true)];

        let merged = VoteTally::from_records(&questions, &[])
            .merge(VoteTally::from_records(&[], &answers));
        assert_eq!(merged, VoteTally::from_records(&questions, &answers));
        assert_eq!(merged.reputation(), compute_reputation(&questions, &answers));
    }
}
