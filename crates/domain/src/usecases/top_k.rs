//! Top-K aggregation over a user's questions

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::model::{QuestionRecord, TopPostEntry, TopTagEntry};

/// Most used tags, by number of questions carrying them.
///
/// Sorted by count descending, then tag name ascending. A tag repeated on one
/// question counts once; blank tags are ignored.
pub fn top_tags(questions: &[QuestionRecord], limit: usize) -> Vec<TopTagEntry> {
    let mut counts: HashMap<&str, u64> = HashMap::new();

    for question in questions {
        let distinct: BTreeSet<&str> = question
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        for tag in distinct {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }

    let mut entries: Vec<TopTagEntry> = counts
        .into_iter()
        .map(|(name, count)| TopTagEntry {
            name: name.to_string(),
            count,
        })
        .collect();

    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries.truncate(limit);
    entries
}

/// Highest voted questions.
///
/// Sorted by upvotes, then views, then creation time, all descending; the
/// question ID (ascending) settles anything left.
pub fn top_posts(questions: &[QuestionRecord], limit: usize) -> Vec<TopPostEntry> {
    let mut ranked: Vec<&QuestionRecord> = questions.iter().collect();
    ranked.sort_by(|a, b| compare_posts(a, b));

    ranked
        .into_iter()
        .take(limit)
        .map(|q| TopPostEntry {
            id: q.id.clone(),
            title: q.title.clone(),
            upvotes: q.upvote_count,
            views: q.view_count,
            replies: q.reply_count,
            created_at: q.created_at,
            solved: q.is_solved,
        })
        .collect()
}

fn compare_posts(a: &QuestionRecord, b: &QuestionRecord) -> Ordering {
    b.upvote_count
        .cmp(&a.upvote_count)
        .then_with(|| b.view_count.cmp(&a.view_count))
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
