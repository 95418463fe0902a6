//! Result size limits for top-K listings and the leaderboard

/// Limit configuration
///
/// Requested limits are clamped into `1..=max_*`; a missing request falls back
/// to the matching default.
#[derive(Debug, Clone)]
pub struct LimitPolicy {
    /// Tags shown on a composed profile
    pub profile_top_tags: usize,
    /// Posts shown on a composed profile
    pub profile_top_posts: usize,
    /// Tags returned by the top-tags accessor when no limit is given
    pub default_top_tags: usize,
    /// Posts returned by the top-posts accessor when no limit is given
    pub default_top_posts: usize,
    pub max_top_tags: usize,
    pub max_top_posts: usize,
    pub default_leaderboard: usize,
    pub max_leaderboard: usize,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            profile_top_tags: 5,
            profile_top_posts: 4,
            default_top_tags: 10,
            default_top_posts: 4,
            max_top_tags: 50,
            max_top_posts: 20,
            default_leaderboard: 10,
            max_leaderboard: 100,
        }
    }
}

impl LimitPolicy {
    /// Effective limit for a top-tags request
    pub fn top_tags(&self, requested: Option<usize>) -> usize {
        clamp_limit(
            requested.unwrap_or(self.default_top_tags),
            self.max_top_tags,
        )
    }

    /// Effective limit for a top-posts request
    pub fn top_posts(&self, requested: Option<usize>) -> usize {
        clamp_limit(
            requested.unwrap_or(self.default_top_posts),
            self.max_top_posts,
        )
    }

    /// Effective limit for a leaderboard request
    pub fn leaderboard(&self, requested: Option<usize>) -> usize {
        clamp_limit(
            requested.unwrap_or(self.default_leaderboard),
            self.max_leaderboard,
        )
    }

    /// Tag limit used when composing a full profile
    pub fn profile_tags(&self) -> usize {
        clamp_limit(self.profile_top_tags, self.max_top_tags)
    }

    /// Post limit used when composing a full profile
    pub fn profile_posts(&self) -> usize {
        clamp_limit(self.profile_top_posts, self.max_top_posts)
    }
}

fn clamp_limit(requested: usize, max: usize) -> usize {
    let effective = requested.clamp(1, max.max(1));
    if effective != requested {
        tracing::debug!(requested, effective, "Clamped result limit");
    }
    effective
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_not_requested() {
        let policy = LimitPolicy::default();
        assert_eq!(policy.top_tags(None), 10);
        assert_eq!(policy.top_posts(None), 4);
        assert_eq!(policy.leaderboard(None), 10);
    }

    #[test]
    fn test_limits_clamp_to_range() {
        let policy = LimitPolicy::default();
        assert_eq!(policy.top_tags(Some(0)), 1);
        assert_eq!(policy.top_tags(Some(500)), 50);
        assert_eq!(policy.top_posts(Some(21)), 20);
        assert_eq!(policy.top_posts(Some(7)), 7);
    }

    #[test]
    fn test_profile_limits() {
        let policy = LimitPolicy::default();
        assert_eq!(policy.profile_tags(), 5);
        assert_eq!(policy.profile_posts(), 4);

        let policy = LimitPolicy {
            profile_top_posts: 40,
            ..Default::default()
        };
        assert_eq!(policy.profile_posts(), 20);
    }

    #[test]
    fn test_zero_max_still_allows_one() {
        let policy = LimitPolicy {
            max_leaderboard: 0,
            ..Default::default()
        };
        assert_eq!(policy.leaderboard(Some(5)), 1);
    }
}
