//! SQLite activity store implementation

use async_trait::async_trait;
use reputation_engine_domain::{
    ActivitySnapshot, ActivityStore, AnswerRecord, Consistency, PopulationMember, QuestionRecord,
    StoreError, UserAccount, VoteTally,
};
use sqlx::{SqliteConnection, SqlitePool, sqlite::SqlitePoolOptions};
use std::collections::HashMap;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::dataset_fs::{CommentKind, Dataset};

/// Rows written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub users: usize,
    pub questions: usize,
    pub comments: usize,
}

/// SQLite-backed activity store
pub struct SqliteActivityStore {
    pool: SqlitePool,
}

type UserRow = (String, String, Option<String>, String);
type QuestionRow = (String, String, String, i64, i64, i64, i64, bool, String);
type AnswerRow = (String, String, String, i64, i64, bool, String);
type QuestionTallyRow = (String, i64, i64, i64);
type AnswerTallyRow = (String, i64, i64, bool);

const ANSWER_FILTER: &str = "kind = 'answer' AND parent_id IS NULL AND is_deleted = 0";

impl SqliteActivityStore {
    /// Create a new SQLite store, initializing the database if needed
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("Failed to create directory: {}", e)))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(db_err)?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(db_err)?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE COLLATE NOCASE,
                display_name TEXT,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS questions (
                id TEXT PRIMARY KEY,
                author_id TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                upvote_count INTEGER NOT NULL DEFAULT 0,
                downvote_count INTEGER NOT NULL DEFAULT 0,
                view_count INTEGER NOT NULL DEFAULT 0,
                reply_count INTEGER NOT NULL DEFAULT 0,
                is_solved INTEGER NOT NULL DEFAULT 0,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS question_tags (
                question_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                tag TEXT NOT NULL,
                PRIMARY KEY (question_id, position)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                author_id TEXT NOT NULL,
                post_id TEXT NOT NULL,
                kind TEXT NOT NULL DEFAULT 'answer',
                parent_id TEXT,
                upvote_count INTEGER NOT NULL DEFAULT 0,
                downvote_count INTEGER NOT NULL DEFAULT 0,
                is_accepted INTEGER NOT NULL DEFAULT 0,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_questions_author ON questions(author_id)",
            "CREATE INDEX IF NOT EXISTS idx_comments_author ON comments(author_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }

        Ok(())
    }

    /// Write a dataset into the store, replacing records with the same IDs
    pub async fn import(&self, dataset: &Dataset) -> Result<ImportSummary, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for user in &dataset.users {
            sqlx::query(
                r#"
                INSERT INTO users (id, username, display_name, created_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    username = excluded.username,
                    display_name = excluded.display_name,
                    created_at = excluded.created_at
                "#,
            )
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.display_name)
            .bind(format_time(user.created_at)?)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        for q in &dataset.questions {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO questions
                (id, author_id, title, upvote_count, downvote_count, view_count,
                 reply_count, is_solved, is_deleted, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&q.id)
            .bind(&q.author_id)
            .bind(&q.title)
            .bind(to_db(q.upvote_count, "question", &q.id, "upvote_count")?)
            .bind(to_db(q.downvote_count, "question", &q.id, "downvote_count")?)
            .bind(to_db(q.view_count, "question", &q.id, "view_count")?)
            .bind(to_db(q.reply_count, "question", &q.id, "reply_count")?)
            .bind(q.is_solved)
            .bind(q.is_deleted)
            .bind(format_time(q.created_at)?)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            sqlx::query("DELETE FROM question_tags WHERE question_id = ?")
                .bind(&q.id)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

            for (position, tag) in q.tags.iter().enumerate() {
                sqlx::query("INSERT INTO question_tags (question_id, position, tag) VALUES (?, ?, ?)")
                    .bind(&q.id)
                    .bind(position as i64)
                    .bind(tag)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
            }
        }

        for c in &dataset.comments {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO comments
                (id, author_id, post_id, kind, parent_id, upvote_count,
                 downvote_count, is_accepted, is_deleted, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&c.id)
            .bind(&c.author_id)
            .bind(&c.post_id)
            .bind(c.kind.as_str())
            .bind(&c.parent_id)
            .bind(to_db(c.upvote_count, "comment", &c.id, "upvote_count")?)
            .bind(to_db(c.downvote_count, "comment", &c.id, "downvote_count")?)
            .bind(c.is_accepted)
            .bind(c.is_deleted)
            .bind(format_time(c.created_at)?)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        let summary = ImportSummary {
            users: dataset.users.len(),
            questions: dataset.questions.len(),
            comments: dataset.comments.len(),
        };
        tracing::info!(
            users = summary.users,
            questions = summary.questions,
            comments = summary.comments,
            "Imported dataset"
        );

        Ok(summary)
    }

    /// Count comments by kind, for diagnostics
    pub async fn comment_kinds(&self) -> Result<HashMap<CommentKind, i64>, StoreError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT kind, COUNT(*) FROM comments GROUP BY kind")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(kind, count)| CommentKind::parse(&kind).map(|k| (k, count)))
            .collect())
    }

    async fn connection(
        &self,
    ) -> Result<sqlx::pool::PoolConnection<sqlx::Sqlite>, StoreError> {
        self.pool.acquire().await.map_err(db_err)
    }
}

#[async_trait]
impl ActivityStore for SqliteActivityStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserAccount>, StoreError> {
        let mut conn = self.connection().await?;
        query_user(&mut conn, user_id).await
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        // username column is COLLATE NOCASE
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, display_name, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(user_from_row).transpose()
    }

    async fn fetch_questions(&self, user_id: &str) -> Result<Vec<QuestionRecord>, StoreError> {
        let mut conn = self.connection().await?;
        query_questions(&mut conn, user_id).await
    }

    async fn fetch_answers(&self, user_id: &str) -> Result<Vec<AnswerRecord>, StoreError> {
        let mut conn = self.connection().await?;
        query_answers(&mut conn, user_id).await
    }

    async fn fetch_all_user_reputation_scores(&self) -> Result<Vec<u64>, StoreError> {
        let mut conn = self.connection().await?;
        let population = query_population(&mut conn).await?;
        Ok(population.iter().map(|m| m.reputation()).collect())
    }

    async fn fetch_population(&self) -> Result<Vec<PopulationMember>, StoreError> {
        let mut conn = self.connection().await?;
        query_population(&mut conn).await
    }

    async fn snapshot(&self, user_id: &str) -> Result<Option<ActivitySnapshot>, StoreError> {
        // every read shares one transaction, so they see the same database state
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let Some(user) = query_user(&mut tx, user_id).await? else {
            tx.rollback().await.map_err(db_err)?;
            return Ok(None);
        };
        let questions = query_questions(&mut tx, user_id).await?;
        let answers = query_answers(&mut tx, user_id).await?;
        let population_scores = query_population(&mut tx)
            .await?
            .iter()
            .map(|m| m.reputation())
            .collect();

        tx.rollback().await.map_err(db_err)?;

        Ok(Some(ActivitySnapshot {
            user,
            questions,
            answers,
            population_scores,
            consistency: Consistency::PointInTime,
        }))
    }
}

async fn query_user(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Option<UserAccount>, StoreError> {
    let row: Option<UserRow> =
        sqlx::query_as("SELECT id, username, display_name, created_at FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err)?;

    row.map(user_from_row).transpose()
}

async fn query_questions(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<QuestionRecord>, StoreError> {
    let rows: Vec<QuestionRow> = sqlx::query_as(
        r#"
        SELECT id, author_id, title, upvote_count, downvote_count, view_count,
               reply_count, is_solved, created_at
        FROM questions
        WHERE author_id = ? AND is_deleted = 0
        ORDER BY created_at, id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;

    let tag_rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT t.question_id, t.tag
        FROM question_tags t
        JOIN questions q ON q.id = t.question_id
        WHERE q.author_id = ? AND q.is_deleted = 0
        ORDER BY t.question_id, t.position
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;

    let mut tags: HashMap<String, Vec<String>> = HashMap::new();
    for (question_id, tag) in tag_rows {
        tags.entry(question_id).or_default().push(tag);
    }

    rows.into_iter()
        .map(
            |(id, author_id, title, up, down, views, replies, is_solved, created_at)| {
                Ok(QuestionRecord {
                    tags: tags.remove(&id).unwrap_or_default(),
                    id,
                    author_id,
                    title,
                    upvote_count: from_db(up),
                    downvote_count: from_db(down),
                    view_count: from_db(views),
                    reply_count: from_db(replies),
                    is_solved,
                    created_at: parse_time(&created_at)?,
                })
            },
        )
        .collect()
}

async fn query_answers(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<AnswerRecord>, StoreError> {
    let sql = format!(
        r#"
        SELECT id, author_id, post_id, upvote_count, downvote_count, is_accepted, created_at
        FROM comments
        WHERE author_id = ? AND {}
        ORDER BY created_at, id
        "#,
        ANSWER_FILTER
    );
    let rows: Vec<AnswerRow> = sqlx::query_as(&sql)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;

    rows.into_iter()
        .map(
            |(id, author_id, question_id, up, down, is_accepted, created_at)| {
                Ok(AnswerRecord {
                    id,
                    author_id,
                    question_id,
                    upvote_count: from_db(up),
                    downvote_count: from_db(down),
                    is_accepted,
                    created_at: parse_time(&created_at)?,
                })
            },
        )
        .collect()
}

async fn query_population(
    conn: &mut SqliteConnection,
) -> Result<Vec<PopulationMember>, StoreError> {
    let users: Vec<UserRow> = sqlx::query_as(
        "SELECT id, username, display_name, created_at FROM users ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;

    let mut members = users
        .into_iter()
        .map(|row| {
            let user = user_from_row(row)?;
            Ok((
                user.id.clone(),
                PopulationMember {
                    user,
                    tally: VoteTally::default(),
                    question_count: 0,
                    answer_count: 0,
                    total_views: 0,
                },
            ))
        })
        .collect::<Result<Vec<_>, StoreError>>()?;
    let index: HashMap<String, usize> = members
        .iter()
        .enumerate()
        .map(|(i, (id, _))| (id.clone(), i))
        .collect();

    // sums are folded here rather than in SQL, where INTEGER overflow is an error
    let questions: Vec<QuestionTallyRow> = sqlx::query_as(
        "SELECT author_id, upvote_count, downvote_count, view_count FROM questions WHERE is_deleted = 0",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;

    for (author_id, up, down, views) in questions {
        if let Some(&i) = index.get(&author_id) {
            let member = &mut members[i].1;
            member.tally = member.tally.merge(VoteTally {
                question_upvotes: from_db(up),
                question_downvotes: from_db(down),
                ..VoteTally::default()
            });
            member.question_count = member.question_count.saturating_add(1);
            member.total_views = member.total_views.saturating_add(from_db(views));
        }
    }

    let sql = format!(
        "SELECT author_id, upvote_count, downvote_count, is_accepted FROM comments WHERE {}",
        ANSWER_FILTER
    );
    let answers: Vec<AnswerTallyRow> = sqlx::query_as(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;

    for (author_id, up, down, is_accepted) in answers {
        if let Some(&i) = index.get(&author_id) {
            let member = &mut members[i].1;
            member.tally = member.tally.merge(VoteTally {
                answer_upvotes: from_db(up),
                answer_downvotes: from_db(down),
                accepted_answers: u64::from(is_accepted),
                ..VoteTally::default()
            });
            member.answer_count = member.answer_count.saturating_add(1);
        }
    }

    Ok(members.into_iter().map(|(_, member)| member).collect())
}

fn user_from_row(
    (id, username, display_name, created_at): UserRow,
) -> Result<UserAccount, StoreError> {
    Ok(UserAccount {
        id,
        username,
        display_name,
        created_at: parse_time(&created_at)?,
    })
}

fn db_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Database(other.to_string()),
    }
}

/// SQLite INTEGER is signed; counters above `i64::MAX` are rejected
fn to_db(value: u64, kind: &str, id: &str, field: &str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| {
        StoreError::Serialization(format!(
            "{} '{}' {} = {} exceeds the SQLite INTEGER range",
            kind, id, field, value
        ))
    })
}

fn from_db(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn format_time(value: OffsetDateTime) -> Result<String, StoreError> {
    value
        .format(&Rfc3339)
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

fn parse_time(value: &str) -> Result<OffsetDateTime, StoreError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset_fs::test_support::{comment, question, sample_dataset};
    use crate::store_memory::InMemoryActivityStore;
    use reputation_engine_domain::usecases::{ProfileConfig, ProfileService};
    use reputation_engine_domain::{FixedClock, UserRef};
    use std::sync::Arc;

    async fn seeded() -> SqliteActivityStore {
        let store = SqliteActivityStore::in_memory().await.unwrap();
        store.import(&sample_dataset()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_import_and_filtered_reads() {
        let store = seeded().await;

        let questions = store.fetch_questions("u1").await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].tags, vec!["rust", "async"]);
        assert_eq!(questions[0].upvote_count, 5);

        let answers = store.fetch_answers("u1").await.unwrap();
        assert_eq!(answers.len(), 1);
        assert!(answers[0].is_accepted);
    }

    #[tokio::test]
    async fn test_population_matches_dataset() {
        let store = seeded().await;
        let dataset = sample_dataset();

        assert_eq!(
            store.fetch_population().await.unwrap(),
            dataset.population()
        );
        assert_eq!(
            store.fetch_all_user_reputation_scores().await.unwrap(),
            vec![83, 0, 0]
        );
    }

    #[tokio::test]
    async fn test_view_totals_past_integer_range_still_compose() {
        let mut dataset = sample_dataset();
        let half = i64::MAX as u64;
        dataset.questions.push(question("q8", "u3", 0, 0, half, &["big"]));
        dataset.questions.push(question("q9", "u3", 0, 0, half, &["big"]));

        let store = SqliteActivityStore::in_memory().await.unwrap();
        store.import(&dataset).await.unwrap();

        let snapshot = store.snapshot("u1").await.unwrap().unwrap();
        assert_eq!(snapshot.population_scores, vec![83, 0, 0]);

        let population = store.fetch_population().await.unwrap();
        assert_eq!(population, dataset.population());
        assert_eq!(population[2].total_views, half * 2);

        let memory = InMemoryActivityStore::new(dataset);
        assert_eq!(
            store.snapshot("u3").await.unwrap().unwrap().fingerprint(),
            memory.snapshot("u3").await.unwrap().unwrap().fingerprint()
        );
    }

    #[tokio::test]
    async fn test_import_rejects_counters_outside_integer_range() {
        let mut dataset = sample_dataset();
        dataset.questions.push(question("q8", "u3", 0, 0, u64::MAX, &[]));

        let store = SqliteActivityStore::in_memory().await.unwrap();
        let err = store.import(&dataset).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        assert!(err.to_string().contains("question 'q8' view_count"));

        // the failed import leaves nothing behind
        assert!(store.fetch_population().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_username_lookup_ignores_case() {
        let store = seeded().await;
        let user = store.find_user_by_username("bob").await.unwrap().unwrap();
        assert_eq!(user.id, "u2");
        assert_eq!(user.username, "Bob");
        assert!(store.find_user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot() {
        let store = seeded().await;

        let snapshot = store.snapshot("u1").await.unwrap().unwrap();
        assert_eq!(snapshot.consistency, Consistency::PointInTime);
        assert_eq!(snapshot.user.username, "alice");
        assert_eq!(snapshot.population_scores, vec![83, 0, 0]);

        assert!(store.snapshot("u404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reimport_replaces_records() {
        let store = seeded().await;

        let mut dataset = sample_dataset();
        dataset.questions[0].upvote_count = 7;
        dataset.questions[0].tags = vec!["rust".to_string()];
        dataset.questions.push(question("q8", "u3", 1, 0, 3, &["go"]));
        dataset.comments.push(comment("c8", "u3", "q1", 0, true));
        let summary = store.import(&dataset).await.unwrap();
        assert_eq!(summary.questions, 4);

        let questions = store.fetch_questions("u1").await.unwrap();
        assert_eq!(questions[0].upvote_count, 7);
        assert_eq!(questions[0].tags, vec!["rust"]);
        assert_eq!(
            store.fetch_all_user_reputation_scores().await.unwrap(),
            vec![103, 0, 25]
        );

        let kinds = store.comment_kinds().await.unwrap();
        assert_eq!(kinds.get(&CommentKind::Answer), Some(&4));
        assert_eq!(kinds.get(&CommentKind::PostComment), Some(&1));
        assert_eq!(kinds.get(&CommentKind::Reply), None);
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("activity.sqlite");

        {
            let store = SqliteActivityStore::new(&path).await.unwrap();
            store.import(&sample_dataset()).await.unwrap();
        }

        let reopened = SqliteActivityStore::new(&path).await.unwrap();
        assert_eq!(reopened.fetch_population().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_profiles_match_memory_store() {
        let clock = Arc::new(FixedClock(OffsetDateTime::UNIX_EPOCH));
        let sqlite = ProfileService::new(
            Arc::new(seeded().await),
            Arc::clone(&clock),
            ProfileConfig::default(),
        );
        let memory = ProfileService::new(
            Arc::new(InMemoryActivityStore::new(sample_dataset())),
            clock,
            ProfileConfig::default(),
        );

        for who in ["u1", "@bob", "u3"] {
            let who = UserRef::parse(who);
            assert_eq!(
                sqlite.compose_profile(&who).await.unwrap(),
                memory.compose_profile(&who).await.unwrap()
            );
        }
        assert_eq!(
            sqlite.leaderboard(None).await.unwrap(),
            memory.leaderboard(None).await.unwrap()
        );
    }
}
