//! Global rank resolution
//!
//! Ranking is competition style: a user's rank is one more than the number of
//! users with a strictly higher score, so equal scores share a rank and the
//! following rank is skipped (`[100, 50, 50, 10]` ranks as `1, 2, 2, 4`).

/// Rank `target` within `all_scores` by a full scan
pub fn compute_global_rank(target: u64, all_scores: &[u64]) -> u64 {
    all_scores.iter().filter(|&&score| score > target).count() as u64 + 1
}

/// Scores sorted in descending order, answering rank queries by binary search
#[derive(Debug, Clone, Default)]
pub struct ScoreIndex {
    descending: Vec<u64>,
}

impl ScoreIndex {
    pub fn new(mut scores: Vec<u64>) -> Self {
        scores.sort_unstable_by(|a, b| b.cmp(a));
        Self { descending: scores }
    }

    /// Rank of `target`; agrees with [`compute_global_rank`] for the same scores
    pub fn rank_of(&self, target: u64) -> u64 {
        self.descending.partition_point(|&score| score > target) as u64 + 1
    }

    pub fn len(&self) -> usize {
        self.descending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descending.is_empty()
    }
}

impl FromIterator<u64> for ScoreIndex {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
