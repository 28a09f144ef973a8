use super::{ScoringStore, StoreResult};
use crate::error::RepositoryError;
use crate::models::{NewScore, Prediction, Race, RaceResult, RaceStatus, Ruleset, Score, UpsertOutcome};
use async_trait::async_trait;
use sqlx::types::Json;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    races: HashMap<Uuid, Race>,
    results: HashMap<Uuid, RaceResult>,
    rulesets: Vec<Ruleset>,
    predictions: Vec<Prediction>,
    // Composite key mirrors the unique (race_id, participant_id) constraint
    scores: HashMap<(Uuid, Uuid), Score>,
    failing_participants: HashSet<Uuid>,
    unavailable: bool,
}

/// In-process `ScoringStore` with the same upsert semantics as Postgres,
/// plus fault injection for tests.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a race with the given status and return it
    pub async fn add_race(&self, pool_id: Uuid, seq: i32, status: RaceStatus) -> Race {
        let race = Race {
            id: Uuid::new_v4(),
            pool_id,
            seq,
            status: status.as_str().to_string(),
            race_date: None,
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.state.write().await.races.insert(race.id, race.clone());
        race
    }

    pub async fn set_race_status(&self, race_id: Uuid, status: RaceStatus) {
        if let Some(race) = self.state.write().await.races.get_mut(&race_id) {
            race.status = status.as_str().to_string();
        }
    }

    /// Insert or replace the official order of a race
    pub async fn set_result(&self, race_id: Uuid, official_order: Vec<Uuid>) {
        self.state
            .write()
            .await
            .results
            .insert(race_id, RaceResult::new(race_id, official_order));
    }

    pub async fn add_ruleset(&self, ruleset: Ruleset) {
        self.state.write().await.rulesets.push(ruleset);
    }

    /// Clear `is_active` on every ruleset of the pool
    pub async fn deactivate_rulesets(&self, pool_id: Uuid) {
        for ruleset in self.state.write().await.rulesets.iter_mut() {
            if ruleset.pool_id == pool_id {
                ruleset.is_active = false;
            }
        }
    }

    pub async fn add_prediction(&self, prediction: Prediction) {
        self.state.write().await.predictions.push(prediction);
    }

    /// Make every upsert for `participant_id` fail
    pub async fn fail_upserts_for(&self, participant_id: Uuid) {
        self.state
            .write()
            .await
            .failing_participants
            .insert(participant_id);
    }

    /// Simulate the backing store going away (or coming back)
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Scores of a race ordered by participant
    pub async fn scores_for_race(&self, race_id: Uuid) -> Vec<Score> {
        let state = self.state.read().await;
        let mut scores: Vec<Score> = state
            .scores
            .values()
            .filter(|s| s.race_id == race_id)
            .cloned()
            .collect();
        scores.sort_by_key(|s| s.participant_id);
        scores
    }

    pub async fn score_for(&self, race_id: Uuid, participant_id: Uuid) -> Option<Score> {
        self.state
            .read()
            .await
            .scores
            .get(&(race_id, participant_id))
            .cloned()
    }

    pub async fn score_count(&self) -> usize {
        self.state.read().await.scores.len()
    }

    fn check_available(state: &MemoryState) -> StoreResult<()> {
        if state.unavailable {
            return Err(RepositoryError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ScoringStore for MemoryStore {
    async fn find_race(&self, race_id: Uuid) -> StoreResult<Option<Race>> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.races.get(&race_id).cloned())
    }

    async fn find_result(&self, race_id: Uuid) -> StoreResult<Option<RaceResult>> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.results.get(&race_id).cloned())
    }

    async fn active_rulesets(&self, pool_id: Uuid) -> StoreResult<Vec<Ruleset>> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state
            .rulesets
            .iter()
            .filter(|r| r.pool_id == pool_id && r.is_active)
            .cloned()
            .collect())
    }

    async fn predictions_for_race(&self, race_id: Uuid) -> StoreResult<Vec<Prediction>> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state
            .predictions
            .iter()
            .filter(|p| p.race_id == race_id)
            .cloned()
            .collect())
    }

    async fn upsert_score(&self, score: &NewScore) -> StoreResult<UpsertOutcome> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        Self::check_available(state)?;
        if state.failing_participants.contains(&score.participant_id) {
            return Err(RepositoryError::Unavailable(format!(
                "write rejected for participant {}",
                score.participant_id
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let key = (score.race_id, score.participant_id);
        match state.scores.get_mut(&key) {
            Some(existing) => {
                existing.points_total = score.points_total;
                existing.breakdown = Json(score.breakdown.clone());
                existing.ruleset_version = score.ruleset_version;
                existing.computed_at = now;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                state.scores.insert(
                    key,
                    Score {
                        id: Uuid::new_v4(),
                        race_id: score.race_id,
                        participant_id: score.participant_id,
                        points_total: score.points_total,
                        breakdown: Json(score.breakdown.clone()),
                        ruleset_version: score.ruleset_version,
                        computed_at: now,
                    },
                );
                Ok(UpsertOutcome::Created)
            }
        }
    }
}
