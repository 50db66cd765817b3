use anyhow::Result;
use chrono::NaiveDate;
use tracing::{error, warn};

use crate::tracker::entities::{Exercise, ProgressSnapshot, StreakRecord};

use super::key_value::KeyValueStore;

pub const EXERCISES_KEY: &str = "exercises";
pub const TRACKED_DATE_KEY: &str = "tracked-date";
pub const STREAK_KEY: &str = "streak";

/// Loads and saves progress through a [KeyValueStore]. Loading never fails: anything missing or
/// malformed reads as absent. Saving is best-effort and only logs failures.
pub struct ProgressPersistence<S> {
    store: S,
}

impl<S: KeyValueStore> ProgressPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn get_or_warn(&self, key: &str) -> Option<String> {
        self.store
            .get(key)
            .await
            .inspect_err(|e| warn!("Failed to read {key}: {e:?}"))
            .ok()
            .flatten()
    }

    pub async fn load(&self) -> Option<ProgressSnapshot> {
        let exercises = self.get_or_warn(EXERCISES_KEY).await?;
        let exercises = match serde_json::from_str::<Vec<Exercise>>(&exercises) {
            Ok(v) if !v.is_empty() => v,
            Ok(_) => {
                warn!("Saved exercise list is empty, ignoring it");
                return None;
            }
            Err(e) => {
                warn!("Saved exercises are corrupted {e}");
                return None;
            }
        };

        let tracked_date = self
            .get_or_warn(TRACKED_DATE_KEY)
            .await
            .and_then(|v| serde_json::from_str::<NaiveDate>(&v).ok())
            // An unknown day never matches today, so its logs get cleared.
            .unwrap_or(NaiveDate::MIN);

        Some(ProgressSnapshot {
            exercises: exercises.into_iter().map(normalize).collect(),
            tracked_date,
        })
    }

    pub async fn try_save(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        self.store
            .set(EXERCISES_KEY, &serde_json::to_string(&snapshot.exercises)?)
            .await?;
        self.store
            .set(
                TRACKED_DATE_KEY,
                &serde_json::to_string(&snapshot.tracked_date)?,
            )
            .await
    }

    pub async fn save(&self, snapshot: &ProgressSnapshot) {
        if let Err(e) = self.try_save(snapshot).await {
            error!("Failed to save progress {e:?}");
        }
    }

    pub async fn load_streak(&self) -> Option<StreakRecord> {
        let streak = self.get_or_warn(STREAK_KEY).await?;
        serde_json::from_str(&streak)
            .inspect_err(|e| warn!("Saved streak is corrupted {e}"))
            .ok()
    }

    pub async fn try_save_streak(&self, record: &StreakRecord) -> Result<()> {
        self.store
            .set(STREAK_KEY, &serde_json::to_string(record)?)
            .await
    }

    pub async fn save_streak(&self, record: &StreakRecord) {
        if let Err(e) = self.try_save_streak(record).await {
            error!("Failed to save streak {e:?}");
        }
    }
}

fn normalize(exercise: Exercise) -> Exercise {
    Exercise {
        goal: exercise.goal.max(1),
        ..exercise
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, anyhow};
    use chrono::NaiveDate;
    use mockall::predicate::eq;
    use tempfile::tempdir;

    use crate::{
        storage::key_value::{FileKeyValueStore, MockKeyValueStore},
        tracker::entities::{Exercise, ProgressSnapshot, StreakRecord, WorkoutHour},
        utils::logging::TEST_LOGGING,
    };

    use super::{EXERCISES_KEY, ProgressPersistence, STREAK_KEY, TRACKED_DATE_KEY};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

    fn store_returning(exercises: Option<&'static str>) -> MockKeyValueStore {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .with(eq(EXERCISES_KEY))
            .returning(move |_| Ok(exercises.map(String::from)));
        store
            .expect_get()
            .with(eq(TRACKED_DATE_KEY))
            .returning(|_| Ok(Some(r#""2024-06-10""#.into())));
        store
    }

    #[tokio::test]
    async fn test_malformed_exercises_are_absent() {
        *TEST_LOGGING;
        for payload in [None, Some("{}"), Some("[]"), Some("[{\"name\": 1}]"), Some("garbage")] {
            let persistence = ProgressPersistence::new(store_returning(payload));
            assert_eq!(persistence.load().await, None, "{payload:?}");
        }
    }

    #[tokio::test]
    async fn test_read_failure_is_absent() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Err(anyhow!("disk on fire")));
        let persistence = ProgressPersistence::new(store);
        assert_eq!(persistence.load().await, None);
        assert_eq!(persistence.load_streak().await, None);
    }

    #[tokio::test]
    async fn test_missing_date_never_matches() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .with(eq(EXERCISES_KEY))
            .returning(|_| Ok(Some(r#"[{"id":"a","name":"A","goal":0}]"#.into())));
        store
            .expect_get()
            .with(eq(TRACKED_DATE_KEY))
            .returning(|_| Ok(None));
        let snapshot = ProgressPersistence::new(store).load().await.unwrap();
        assert_eq!(snapshot.tracked_date, NaiveDate::MIN);
        assert_eq!(snapshot.exercises[0].goal, 1);
    }

    #[tokio::test]
    async fn test_save_failure_is_swallowed() {
        *TEST_LOGGING;
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .times(2)
            .returning(|_, _| Err(anyhow!("read-only")));
        let persistence = ProgressPersistence::new(store);
        persistence
            .save(&ProgressSnapshot {
                exercises: vec![Exercise::new("a", "A", 1)],
                tracked_date: TEST_DATE,
            })
            .await;
        persistence.save_streak(&StreakRecord::default()).await;
    }

    #[tokio::test]
    async fn test_streak_written_under_its_key() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .withf(|key, value| key == STREAK_KEY && value == r#"{"count":2,"lastDate":"2024-06-10"}"#)
            .times(1)
            .returning(|_, _| Ok(()));
        let persistence = ProgressPersistence::new(store);
        persistence
            .save_streak(&StreakRecord {
                count: 2,
                last_date: Some(TEST_DATE),
            })
            .await;
    }

    #[tokio::test]
    async fn test_file_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let persistence = ProgressPersistence::new(FileKeyValueStore::new(dir.path().to_owned())?);

        let mut exercise = Exercise::new("a", "Alpha", 10);
        exercise
            .hourly_logs
            .set(WorkoutHour::new_opt(11).unwrap(), 6);
        let snapshot = ProgressSnapshot {
            exercises: vec![exercise],
            tracked_date: TEST_DATE,
        };
        let streak = StreakRecord {
            count: 4,
            last_date: Some(TEST_DATE),
        };

        persistence.try_save(&snapshot).await?;
        persistence.try_save_streak(&streak).await?;

        assert_eq!(persistence.load().await, Some(snapshot));
        assert_eq!(persistence.load_streak().await, Some(streak));
        Ok(())
    }
}
