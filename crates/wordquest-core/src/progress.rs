//! Progress aggregation.
//!
//! Folds completed session results into each player's cumulative record
//! and appends them to the player's session history. Folds for the same
//! player are serialized behind a per-player lock because each one is a
//! read-modify-write of the stored record.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::achievements::{evaluate_with, AchievementThresholds};
use crate::error::StoreError;
use crate::model::{Achievement, PlayerId, Progress, SessionResult};
use crate::traits::{Collection, Direction, Document, DocumentStore, ListQuery};

/// A history document: the session result plus its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryEntry {
    player_id: PlayerId,
    #[serde(flatten)]
    result: SessionResult,
}

/// What a fold produced.
#[derive(Debug)]
pub struct FoldOutcome {
    /// The updated record. Authoritative even if persisting it failed.
    pub progress: Progress,
    /// Achievements unlocked by this fold.
    pub newly_unlocked: BTreeSet<Achievement>,
    /// First write failure, if any. The fold still counts in memory.
    pub persistence_error: Option<StoreError>,
}

impl FoldOutcome {
    pub fn is_persisted(&self) -> bool {
        self.persistence_error.is_none()
    }
}

/// Owner of every player's progress record and session history.
pub struct ProgressAggregator {
    store: Arc<dyn DocumentStore>,
    thresholds: AchievementThresholds,
    locks: Mutex<HashMap<PlayerId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProgressAggregator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_thresholds(store, AchievementThresholds::default())
    }

    pub fn with_thresholds(store: Arc<dyn DocumentStore>, thresholds: AchievementThresholds) -> Self {
        Self {
            store,
            thresholds,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn thresholds(&self) -> &AchievementThresholds {
        &self.thresholds
    }

    fn player_lock(&self, player: &PlayerId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(locks.entry(player.clone()).or_default())
    }

    /// Drop a player's lock entry once nobody else holds or awaits it.
    fn release_lock(&self, player: &PlayerId, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let idle = locks
            .get(player)
            .is_some_and(|held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
        drop(lock);
        if idle {
            locks.remove(player);
        }
    }

    #[cfg(test)]
    fn tracked_players(&self) -> usize {
        match self.locks.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    async fn load(&self, player: &PlayerId) -> Result<Option<Progress>, StoreError> {
        let query = ListQuery::new()
            .where_eq("player_id", player.as_str())
            .limit(Some(1));
        let mut docs = self.store.list(Collection::Progress, &query).await?;
        match docs.pop() {
            Some(doc) => Ok(Some(doc.into_record()?)),
            None => Ok(None),
        }
    }

    /// The player's record, created with zero values on first access.
    pub async fn get_progress(&self, player: &PlayerId) -> Result<Progress, StoreError> {
        let lock = self.player_lock(player);
        let progress = {
            let _guard = lock.lock().await;
            self.load_or_create(player).await
        };
        self.release_lock(player, lock);
        progress
    }

    async fn load_or_create(&self, player: &PlayerId) -> Result<Progress, StoreError> {
        if let Some(progress) = self.load(player).await? {
            return Ok(progress);
        }
        let progress = Progress::new(player.clone());
        self.store
            .create(
                Collection::Progress,
                Document::from_record(progress.id, &progress)?,
            )
            .await?;
        tracing::info!(player = %player, "created progress record");
        Ok(progress)
    }

    /// Completed sessions, most recent first.
    pub async fn history(
        &self,
        player: &PlayerId,
        limit: Option<usize>,
    ) -> Result<Vec<SessionResult>, StoreError> {
        let query = ListQuery::new()
            .where_eq("player_id", player.as_str())
            .order_by("completed_at", Direction::Desc)
            .limit(limit);
        self.store
            .list(Collection::Sessions, &query)
            .await?
            .into_iter()
            .map(|doc| doc.into_record::<HistoryEntry>().map(|e| e.result))
            .collect()
    }

    /// Achievements derived from the current record and full history.
    pub async fn achievements(&self, player: &PlayerId) -> Result<BTreeSet<Achievement>, StoreError> {
        let (progress, history) =
            futures::try_join!(self.get_progress(player), self.history(player, None))?;
        Ok(evaluate_with(&progress, &history, &self.thresholds))
    }

    /// Merge one completed session into the player's progress.
    ///
    /// Each result counts once. Folding a result whose id is already in the
    /// history fails with [`StoreError::AlreadyExists`] and changes nothing.
    ///
    /// Failing to read the existing record aborts the fold. Failing to
    /// write is reported in [`FoldOutcome::persistence_error`] while the
    /// returned progress still reflects the session.
    pub async fn fold(
        &self,
        player: &PlayerId,
        result: &SessionResult,
    ) -> Result<FoldOutcome, StoreError> {
        let lock = self.player_lock(player);
        let outcome = {
            let _guard = lock.lock().await;
            self.fold_locked(player, result).await
        };
        self.release_lock(player, lock);
        outcome
    }

    async fn fold_locked(
        &self,
        player: &PlayerId,
        result: &SessionResult,
    ) -> Result<FoldOutcome, StoreError> {
        let existing = self.load(player).await?;
        let is_new = existing.is_none();
        let mut progress = existing.unwrap_or_else(|| Progress::new(player.clone()));

        let mut persistence_error = None;

        let entry = HistoryEntry {
            player_id: player.clone(),
            result: result.clone(),
        };
        let appended = match Document::from_record(result.id, &entry) {
            Ok(doc) => self.store.create(Collection::Sessions, doc).await.map(|_| ()),
            Err(e) => Err(e),
        };
        match appended {
            Ok(()) => {}
            Err(e @ StoreError::AlreadyExists { .. }) => {
                tracing::warn!(player = %player, session = %result.id, "session already folded");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(player = %player, session = %result.id, "failed to append session history: {e}");
                persistence_error = Some(e);
            }
        }

        progress.absorb(result);

        let mut history = match self.history(player, None).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(player = %player, "evaluating achievements without stored history: {e}");
                persistence_error.get_or_insert(e);
                Vec::new()
            }
        };
        if !history.iter().any(|h| h.id == result.id) {
            history.insert(0, result.clone());
        }
        let unlocked = evaluate_with(&progress, &history, &self.thresholds);
        let newly_unlocked: BTreeSet<Achievement> = unlocked
            .difference(&progress.achievements)
            .copied()
            .collect();
        progress.achievements.extend(unlocked);

        if let Err(e) = self.save(&progress, is_new).await {
            tracing::warn!(player = %player, "failed to persist progress: {e}");
            persistence_error.get_or_insert(e);
        }

        tracing::info!(
            player = %player,
            game = %result.game_type,
            score = result.score,
            total_score = progress.total_score,
            level = progress.level(),
            "folded session"
        );

        Ok(FoldOutcome {
            progress,
            newly_unlocked,
            persistence_error,
        })
    }

    async fn save(&self, progress: &Progress, is_new: bool) -> Result<(), StoreError> {
        let doc = Document::from_record(progress.id, progress)?;
        if is_new {
            self.store.create(Collection::Progress, doc).await?;
        } else {
            self.store
                .update(Collection::Progress, progress.id, doc.fields)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GameType, WordId};
    use crate::store::MemoryStore;

    fn result(game_type: GameType, score: u32, words: &[u32]) -> SessionResult {
        SessionResult::new(
            game_type,
            score,
            score.min(words.len() as u32),
            words.len() as u32,
            words.iter().map(|&w| WordId(w)).collect(),
        )
    }

    fn aggregator() -> (Arc<MemoryStore>, ProgressAggregator) {
        let store = Arc::new(MemoryStore::new());
        let agg = ProgressAggregator::new(store.clone());
        (store, agg)
    }

    #[tokio::test]
    async fn get_progress_creates_zero_record_once() {
        let (store, agg) = aggregator();
        let player = PlayerId::new("alice");

        let first = agg.get_progress(&player).await.unwrap();
        assert_eq!(first.total_score, 0);
        assert_eq!(first.level(), 1);
        assert!(first.words_learned.is_empty());

        let second = agg.get_progress(&player).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn sequential_folds_union_words() {
        let (_store, agg) = aggregator();
        let player = PlayerId::new("alice");

        agg.fold(&player, &result(GameType::Quiz, 3, &[1, 2, 3]))
            .await
            .unwrap();
        let outcome = agg
            .fold(&player, &result(GameType::Quiz, 2, &[3, 4, 5]))
            .await
            .unwrap();

        let expected: BTreeSet<WordId> = (1..=5).map(WordId).collect();
        assert!(outcome.is_persisted());
        assert_eq!(outcome.progress.words_learned, expected);
        assert_eq!(outcome.progress.total_score, 5);
        assert_eq!(outcome.progress.level(), 1);

        let stored = agg.get_progress(&player).await.unwrap();
        assert_eq!(stored.words_learned, expected);
        assert_eq!(stored.total_score, 5);
    }

    #[tokio::test]
    async fn fold_is_monotonic() {
        let (_store, agg) = aggregator();
        let player = PlayerId::new("bob");
        let mut before = agg.get_progress(&player).await.unwrap();

        for (i, words) in [[1, 2], [2, 9], [7, 8]].iter().enumerate() {
            let after = agg
                .fold(&player, &result(GameType::Match, 10 * i as u32, words))
                .await
                .unwrap()
                .progress;
            assert!(after.words_learned.is_superset(&before.words_learned));
            assert!(after.total_score >= before.total_score);
            assert!(after.achievements.is_superset(&before.achievements));
            before = after;
        }
    }

    #[tokio::test]
    async fn history_is_most_recent_first_and_per_player() {
        let (_store, agg) = aggregator();
        let alice = PlayerId::new("alice");
        let bob = PlayerId::new("bob");

        let first = result(GameType::Quiz, 1, &[1]);
        let second = result(GameType::Match, 70, &[2]);
        agg.fold(&alice, &first).await.unwrap();
        agg.fold(&bob, &result(GameType::Quiz, 4, &[3])).await.unwrap();
        agg.fold(&alice, &second).await.unwrap();

        let history = agg.history(&alice, None).await.unwrap();
        let ids: Vec<_> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let limited = agg.history(&alice, Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, second.id);
    }

    #[tokio::test]
    async fn fold_unlocks_achievements() {
        let (_store, agg) = aggregator();
        let player = PlayerId::new("carol");

        let outcome = agg
            .fold(&player, &result(GameType::Quiz, 10, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]))
            .await
            .unwrap();
        assert!(outcome.newly_unlocked.contains(&Achievement::FirstGame));
        assert!(outcome.newly_unlocked.contains(&Achievement::WordCollector));

        let again = agg
            .fold(&player, &result(GameType::Quiz, 1, &[1]))
            .await
            .unwrap();
        assert!(again.newly_unlocked.is_empty());
        assert!(again.progress.achievements.contains(&Achievement::FirstGame));

        let derived = agg.achievements(&player).await.unwrap();
        assert_eq!(derived, again.progress.achievements);
    }

    #[tokio::test]
    async fn write_failure_keeps_in_memory_result() {
        let (store, agg) = aggregator();
        let player = PlayerId::new("dave");
        agg.get_progress(&player).await.unwrap();

        store.set_fail_writes(true);
        let outcome = agg
            .fold(&player, &result(GameType::Quiz, 4, &[1, 2]))
            .await
            .unwrap();
        assert!(!outcome.is_persisted());
        assert_eq!(outcome.progress.total_score, 4);

        store.set_fail_writes(false);
        let stored = agg.get_progress(&player).await.unwrap();
        assert_eq!(stored.total_score, 0);
        assert!(agg.history(&player, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn write_failure_still_unlocks_achievements() {
        let (store, agg) = aggregator();
        let player = PlayerId::new("dave");
        agg.get_progress(&player).await.unwrap();

        store.set_fail_writes(true);
        let outcome = agg
            .fold(&player, &result(GameType::Quiz, 4, &[1, 2]))
            .await
            .unwrap();
        assert!(!outcome.is_persisted());
        assert!(outcome.newly_unlocked.contains(&Achievement::FirstGame));
        assert!(outcome.progress.achievements.contains(&Achievement::FirstGame));
    }

    #[tokio::test]
    async fn replayed_result_is_rejected_without_saving() {
        let (_store, agg) = aggregator();
        let player = PlayerId::new("frank");
        let session = result(GameType::Quiz, 6, &[1, 2, 3]);

        agg.fold(&player, &session).await.unwrap();
        let err = agg.fold(&player, &session).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let stored = agg.get_progress(&player).await.unwrap();
        assert_eq!(stored.total_score, 6);
        assert_eq!(agg.history(&player, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn player_locks_are_released() {
        let (_store, agg) = aggregator();
        let agg = Arc::new(agg);

        let mut handles = Vec::new();
        for i in 0..6u32 {
            let agg = Arc::clone(&agg);
            let player = PlayerId::new(format!("guest-{}", i % 3));
            handles.push(tokio::spawn(async move {
                agg.fold(&player, &result(GameType::Match, 1, &[i]))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        agg.get_progress(&PlayerId::new("guest-0")).await.unwrap();

        assert_eq!(agg.tracked_players(), 0);
    }

    #[tokio::test]
    async fn concurrent_folds_do_not_lose_updates() {
        let (_store, agg) = aggregator();
        let agg = Arc::new(agg);
        let player = PlayerId::new("eve");

        let mut handles = Vec::new();
        for i in 0..8u32 {
            let agg = Arc::clone(&agg);
            let player = player.clone();
            handles.push(tokio::spawn(async move {
                agg.fold(&player, &result(GameType::Quiz, 1, &[i]))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let progress = agg.get_progress(&player).await.unwrap();
        assert_eq!(progress.total_score, 8);
        assert_eq!(progress.words_learned.len(), 8);
        assert_eq!(agg.history(&player, None).await.unwrap().len(), 8);
    }
}
