//! Badge evaluation
//!
//! Badges are a pure function of current counters. Every rule in
//! [`BADGE_RULES`] is checked on each evaluation and each satisfied rule adds
//! one to its tier; rules inside a tier do not exclude each other.

use serde::{Deserialize, Serialize};

use crate::model::{BadgeTally, UserStatistics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    Gold,
    Silver,
    Bronze,
}

/// Counter a badge rule is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeMetric {
    Reputation,
    AcceptedAnswers,
    Questions,
    Answers,
    TotalViews,
}

/// Fires when `metric >= threshold`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeRule {
    pub name: &'static str,
    pub tier: BadgeTier,
    pub metric: BadgeMetric,
    pub threshold: u64,
}

const fn rule(name: &'static str, tier: BadgeTier, metric: BadgeMetric, threshold: u64) -> BadgeRule {
    BadgeRule {
        name,
        tier,
        metric,
        threshold,
    }
}

use BadgeMetric::{AcceptedAnswers, Answers, Questions, Reputation, TotalViews};
use BadgeTier::{Bronze, Gold, Silver};

/// The complete badge rule table
pub const BADGE_RULES: &[BadgeRule] = &[
    rule("Legend", Gold, Reputation, 50_000),
    rule("Virtuoso", Gold, Reputation, 25_000),
    rule("Master", Gold, Reputation, 10_000),
    rule("Guru", Gold, AcceptedAnswers, 100),
    rule("Sage", Gold, AcceptedAnswers, 500),
    rule("Famous Author", Gold, TotalViews, 1_000_000),
    rule("Expert", Silver, Reputation, 5_000),
    rule("Specialist", Silver, Reputation, 2_500),
    rule("Established", Silver, Reputation, 1_000),
    rule("Mentor", Silver, AcceptedAnswers, 50),
    rule("Problem Solver", Silver, AcceptedAnswers, 25),
    rule("Curious Mind", Silver, Questions, 50),
    rule("Helper", Silver, Answers, 100),
    rule("Notable Author", Silver, TotalViews, 100_000),
    rule("Student", Bronze, Questions, 1),
    rule("Answerer", Bronze, Answers, 1),
    rule("Contributor", Bronze, Reputation, 100),
    rule("Regular", Bronze, Reputation, 500),
    rule("Scholar", Bronze, AcceptedAnswers, 1),
    rule("Tutor", Bronze, AcceptedAnswers, 10),
    rule("Inquirer", Bronze, Questions, 10),
    rule("Responder", Bronze, Answers, 10),
    rule("Enthusiast", Bronze, Answers, 50),
];

/// Counters a badge evaluation reads; anything unknown is zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeCounters {
    pub reputation: u64,
    pub accepted_answers: u64,
    pub question_count: u64,
    pub answer_count: u64,
    pub total_views: u64,
}

impl BadgeCounters {
    pub fn get(&self, metric: BadgeMetric) -> u64 {
        match metric {
            Reputation => self.reputation,
            AcceptedAnswers => self.accepted_answers,
            Questions => self.question_count,
            Answers => self.answer_count,
            TotalViews => self.total_views,
        }
    }
}

impl From<&UserStatistics> for BadgeCounters {
    fn from(stats: &UserStatistics) -> Self {
        Self {
            reputation: stats.reputation,
            accepted_answers: stats.accepted_answers,
            question_count: stats.total_questions,
            answer_count: stats.total_answers,
            total_views: stats.total_views,
        }
    }
}

impl BadgeRule {
    pub fn is_satisfied(&self, counters: &BadgeCounters) -> bool {
        counters.get(self.metric) >= self.threshold
    }
}

/// Count satisfied rules per tier
pub fn compute_badges(counters: &BadgeCounters) -> BadgeTally {
    let mut tally = BadgeTally::default();
    for rule in BADGE_RULES.iter().filter(|r| r.is_satisfied(counters)) {
        match rule.tier {
            Gold => tally.gold += 1,
            Silver => tally.silver += 1,
            Bronze => tally.bronze += 1,
        }
    }
    tally
}

/// Satisfied rules in table order
pub fn earned_badges(counters: &BadgeCounters) -> Vec<&'static BadgeRule> {
    BADGE_RULES
        .iter()
        .filter(|r| r.is_satisfied(counters))
        .collect()
}
