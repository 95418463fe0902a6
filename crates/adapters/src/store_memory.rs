//! In-memory activity store for testing and offline mode

use async_trait::async_trait;
use reputation_engine_domain::{
    ActivitySnapshot, ActivityStore, AnswerRecord, Consistency, PopulationMember, QuestionRecord,
    StoreError, UserAccount,
};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard};

use crate::dataset_fs::{Dataset, DatasetError};

/// In-memory activity store backed by a [`Dataset`]
pub struct InMemoryActivityStore {
    data: RwLock<Dataset>,
}

impl InMemoryActivityStore {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            data: RwLock::new(dataset),
        }
    }

    /// Load a dataset file into a new store
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Ok(Self::new(Dataset::from_path(path)?))
    }

    /// Apply a write to the underlying dataset
    pub fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Dataset),
    {
        let mut data = self
            .data
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        f(&mut data);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Dataset>, StoreError> {
        self.data
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl Default for InMemoryActivityStore {
    fn default() -> Self {
        Self::new(Dataset::default())
    }
}

#[async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.read()?.find_user(user_id).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.read()?.find_user_by_username(username).cloned())
    }

    async fn fetch_questions(&self, user_id: &str) -> Result<Vec<QuestionRecord>, StoreError> {
        Ok(self.read()?.questions_by(user_id))
    }

    async fn fetch_answers(&self, user_id: &str) -> Result<Vec<AnswerRecord>, StoreError> {
        Ok(self.read()?.answers_by(user_id))
    }

    async fn fetch_all_user_reputation_scores(&self) -> Result<Vec<u64>, StoreError> {
        Ok(self.read()?.reputation_scores())
    }

    async fn fetch_population(&self) -> Result<Vec<PopulationMember>, StoreError> {
        Ok(self.read()?.population())
    }

    async fn snapshot(&self, user_id: &str) -> Result<Option<ActivitySnapshot>, StoreError> {
        // one guard for every read
        let data = self.read()?;
        let Some(user) = data.find_user(user_id).cloned() else {
            return Ok(None);
        };

        Ok(Some(ActivitySnapshot {
            user,
            questions: data.questions_by(user_id),
            answers: data.answers_by(user_id),
            population_scores: data.reputation_scores(),
            consistency: Consistency::PointInTime,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset_fs::test_support::{question, sample_dataset};

    #[tokio::test]
    async fn test_reads_apply_filters() {
        let store = InMemoryActivityStore::new(sample_dataset());

        assert_eq!(store.fetch_questions("u1").await.unwrap().len(), 1);
        assert_eq!(store.fetch_answers("u1").await.unwrap().len(), 1);
        assert_eq!(
            store.fetch_all_user_reputation_scores().await.unwrap(),
            vec![83, 0, 0]
        );
    }

    #[tokio::test]
    async fn test_find_user() {
        let store = InMemoryActivityStore::new(sample_dataset());

        assert_eq!(store.find_user("u3").await.unwrap().unwrap().username, "carol");
        assert!(store.find_user("u9").await.unwrap().is_none());
        assert_eq!(
            store.find_user_by_username("BOB").await.unwrap().unwrap().id,
            "u2"
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_point_in_time() {
        let store = InMemoryActivityStore::new(sample_dataset());

        let snapshot = store.snapshot("u1").await.unwrap().unwrap();
        assert_eq!(snapshot.consistency, Consistency::PointInTime);
        assert_eq!(snapshot.questions.len(), 1);
        assert_eq!(snapshot.answers.len(), 1);
        assert_eq!(snapshot.population_scores.len(), 3);

        assert!(store.snapshot("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_updates_are_visible_to_next_read() {
        let store = InMemoryActivityStore::new(sample_dataset());
        let before = store.snapshot("u2").await.unwrap().unwrap().fingerprint();

        store
            .update(|data| data.questions.push(question("q7", "u2", 3, 0, 5, &["go"])))
            .unwrap();

        let after = store.snapshot("u2").await.unwrap().unwrap();
        assert_eq!(after.questions.len(), 2);
        assert_ne!(after.fingerprint(), before);
        assert_eq!(
            store.fetch_all_user_reputation_scores().await.unwrap(),
            vec![83, 30, 0]
        );
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = InMemoryActivityStore::default();
        assert!(store.fetch_population().await.unwrap().is_empty());
        assert!(store.find_user("u1").await.unwrap().is_none());
    }
}
