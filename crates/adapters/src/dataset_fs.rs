//! JSON activity dataset: the export format both stores are seeded from
//!
//! A dataset mirrors the raw collections of the forum: users, questions, and
//! comments. Only some comments are answers; post comments, threaded replies
//! and deleted records are kept in the file but filtered out on read.

use reputation_engine_domain::{
    AnswerRecord, PopulationMember, QuestionRecord, UserAccount, VoteTally,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use time::OffsetDateTime;

/// Error type for dataset loading and validation
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },
    #[error("Duplicate {kind} ID '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("Duplicate username '{username}'")]
    DuplicateUsername { username: String },
    #[error("{kind} '{id}' references unknown author '{author_id}'")]
    UnknownAuthor {
        kind: &'static str,
        id: String,
        author_id: String,
    },
}

/// What a stored comment is attached to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// Answer to a question
    #[default]
    Answer,
    /// Remark on the question itself
    PostComment,
    /// Threaded reply to another comment
    Reply,
}

impl CommentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answer => "answer",
            Self::PostComment => "post_comment",
            Self::Reply => "reply",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "answer" => Some(Self::Answer),
            "post_comment" => Some(Self::PostComment),
            "reply" => Some(Self::Reply),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredQuestion {
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
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_solved: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl StoredQuestion {
    pub fn to_record(&self) -> QuestionRecord {
        QuestionRecord {
            id: self.id.clone(),
            author_id: self.author_id.clone(),
            title: self.title.clone(),
            upvote_count: self.upvote_count,
            downvote_count: self.downvote_count,
            view_count: self.view_count,
            reply_count: self.reply_count,
            tags: self.tags.clone(),
            is_solved: self.is_solved,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredComment {
    pub id: String,
    pub author_id: String,
    /// Question the comment belongs to
    pub post_id: String,
    #[serde(default)]
    pub kind: CommentKind,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub upvote_count: u64,
    #[serde(default)]
    pub downvote_count: u64,
    #[serde(default)]
    pub is_accepted: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl StoredComment {
    /// Top-level, live answer
    pub fn is_answer(&self) -> bool {
        self.kind == CommentKind::Answer && self.parent_id.is_none() && !self.is_deleted
    }

    pub fn to_record(&self) -> AnswerRecord {
        AnswerRecord {
            id: self.id.clone(),
            author_id: self.author_id.clone(),
            question_id: self.post_id.clone(),
            upvote_count: self.upvote_count,
            downvote_count: self.downvote_count,
            is_accepted: self.is_accepted,
            created_at: self.created_at,
        }
    }
}

/// A complete activity export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<UserAccount>,
    #[serde(default)]
    pub questions: Vec<StoredQuestion>,
    #[serde(default)]
    pub comments: Vec<StoredComment>,
}

impl Dataset {
    /// Parse and validate a dataset from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&content).map_err(|e| match e {
            DatasetError::Parse { message, .. } => DatasetError::Parse {
                file: path.display().to_string(),
                message,
            },
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            users = dataset.users.len(),
            questions = dataset.questions.len(),
            comments = dataset.comments.len(),
            "Loaded dataset"
        );

        Ok(dataset)
    }

    /// Parse and validate a dataset from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, DatasetError> {
        let dataset: Self = serde_json::from_str(content).map_err(|e| DatasetError::Parse {
            file: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check ID uniqueness and that every record has a known author
    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut user_ids = HashSet::new();
        let mut usernames = HashSet::new();
        for user in &self.users {
            if !user_ids.insert(user.id.as_str()) {
                return Err(DatasetError::DuplicateId {
                    kind: "user",
                    id: user.id.clone(),
                });
            }
            if !usernames.insert(user.username.to_ascii_lowercase()) {
                return Err(DatasetError::DuplicateUsername {
                    username: user.username.clone(),
                });
            }
        }

        let mut question_ids = HashSet::new();
        for q in &self.questions {
            if !question_ids.insert(q.id.as_str()) {
                return Err(DatasetError::DuplicateId {
                    kind: "question",
                    id: q.id.clone(),
                });
            }
            if !user_ids.contains(q.author_id.as_str()) {
                return Err(DatasetError::UnknownAuthor {
                    kind: "question",
                    id: q.id.clone(),
                    author_id: q.author_id.clone(),
                });
            }
        }

        let mut comment_ids = HashSet::new();
        for c in &self.comments {
            if !comment_ids.insert(c.id.as_str()) {
                return Err(DatasetError::DuplicateId {
                    kind: "comment",
                    id: c.id.clone(),
                });
            }
            if !user_ids.contains(c.author_id.as_str()) {
                return Err(DatasetError::UnknownAuthor {
                    kind: "comment",
                    id: c.id.clone(),
                    author_id: c.author_id.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn find_user(&self, user_id: &str) -> Option<&UserAccount> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<&UserAccount> {
        self.users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
    }

    /// Live questions by the user
    pub fn questions_by(&self, user_id: &str) -> Vec<QuestionRecord> {
        self.questions
            .iter()
            .filter(|q| q.author_id == user_id && !q.is_deleted)
            .map(StoredQuestion::to_record)
            .collect()
    }

    /// Live top-level answers by the user
    pub fn answers_by(&self, user_id: &str) -> Vec<AnswerRecord> {
        self.comments
            .iter()
            .filter(|c| c.author_id == user_id && c.is_answer())
            .map(StoredComment::to_record)
            .collect()
    }

    /// Every user with their aggregates, in user ID order
    pub fn population(&self) -> Vec<PopulationMember> {
        let mut members: HashMap<&str, PopulationMember> = self
            .users
            .iter()
            .map(|u| {
                (
                    u.id.as_str(),
                    PopulationMember {
                        user: u.clone(),
                        tally: VoteTally::default(),
                        question_count: 0,
                        answer_count: 0,
                        total_views: 0,
                    },
                )
            })
            .collect();

        for q in self.questions.iter().filter(|q| !q.is_deleted) {
            if let Some(member) = members.get_mut(q.author_id.as_str()) {
                member.tally = member
                    .tally
                    .merge(VoteTally::from_records(&[q.to_record()], &[]));
                member.question_count += 1;
                member.total_views = member.total_views.saturating_add(q.view_count);
            }
        }

        for c in self.comments.iter().filter(|c| c.is_answer()) {
            if let Some(member) = members.get_mut(c.author_id.as_str()) {
                member.tally = member
                    .tally
                    .merge(VoteTally::from_records(&[], &[c.to_record()]));
                member.answer_count += 1;
            }
        }

        let mut members: Vec<_> = members.into_values().collect();
        members.sort_by(|a, b| a.user.id.cmp(&b.user.id));
        members
    }

    /// Reputation of every user
    pub fn reputation_scores(&self) -> Vec<u64> {
        self.population().iter().map(|m| m.reputation()).collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use time::Duration;

    fn at(days: i64) -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::days(days)
    }

    pub(crate) fn user(id: &str, username: &str) -> UserAccount {
        UserAccount {
            id: id.to_string(),
            username: username.to_string(),
            display_name: Some(username.to_uppercase()),
            created_at: at(1),
        }
    }

    pub(crate) fn question(
        id: &str,
        author: &str,
        upvotes: u64,
        downvotes: u64,
        views: u64,
        tags: &[&str],
    ) -> StoredQuestion {
        StoredQuestion {
            id: id.to_string(),
            author_id: author.to_string(),
            title: format!("Question {}", id),
            upvote_count: upvotes,
            downvote_count: downvotes,
            view_count: views,
            reply_count: 1,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_solved: false,
            is_deleted: false,
            created_at: at(10 + upvotes as i64),
        }
    }

    pub(crate) fn comment(
        id: &str,
        author: &str,
        post_id: &str,
        upvotes: u64,
        accepted: bool,
    ) -> StoredComment {
        StoredComment {
            id: id.to_string(),
            author_id: author.to_string(),
            post_id: post_id.to_string(),
            kind: CommentKind::Answer,
            parent_id: None,
            upvote_count: upvotes,
            downvote_count: 0,
            is_accepted: accepted,
            is_deleted: false,
            created_at: at(20),
        }
    }

    /// alice: 5 up / 1 down question, accepted answer with 2 up -> 83
    /// bob: one unvoted question with 17 views -> 0
    /// carol: no activity -> 0
    /// Deleted and non-answer records would add to alice if counted.
    pub(crate) fn sample_dataset() -> Dataset {
        let mut deleted_question = question("q-del", "u1", 50, 0, 1000, &["rust"]);
        deleted_question.is_deleted = true;

        let mut post_comment = comment("c-post", "u1", "q2", 30, false);
        post_comment.kind = CommentKind::PostComment;

        let mut reply = comment("c-reply", "u1", "q2", 30, false);
        reply.parent_id = Some("c1".to_string());

        let mut deleted_answer = comment("c-del", "u1", "q2", 30, true);
        deleted_answer.is_deleted = true;

        Dataset {
            users: vec![user("u1", "alice"), user("u2", "Bob"), user("u3", "carol")],
            questions: vec![
                question("q1", "u1", 5, 1, 120, &["rust", "async"]),
                question("q2", "u2", 0, 0, 17, &["python"]),
                deleted_question,
            ],
            comments: vec![
                comment("c1", "u1", "q2", 2, true),
                post_comment,
                reply,
                deleted_answer,
            ],
        }
    }
}
