use super::{ScoringStore, StoreResult};
use crate::models::{NewScore, Prediction, Race, RaceResult, Ruleset, UpsertOutcome};
use crate::repositories::{PredictionRepository, RaceRepository, RulesetRepository, ScoreRepository};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// `ScoringStore` backed by the Postgres repositories
#[derive(Clone)]
pub struct PgScoringStore {
    race_repo: Arc<RaceRepository>,
    ruleset_repo: Arc<RulesetRepository>,
    prediction_repo: Arc<PredictionRepository>,
    score_repo: Arc<ScoreRepository>,
}

impl PgScoringStore {
    pub fn new(
        race_repo: Arc<RaceRepository>,
        ruleset_repo: Arc<RulesetRepository>,
        prediction_repo: Arc<PredictionRepository>,
        score_repo: Arc<ScoreRepository>,
    ) -> Self {
        Self {
            race_repo,
            ruleset_repo,
            prediction_repo,
            score_repo,
        }
    }

    /// Build the store with fresh repositories over `pool`
    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(
            Arc::new(RaceRepository::new(pool.clone())),
            Arc::new(RulesetRepository::new(pool.clone())),
            Arc::new(PredictionRepository::new(pool.clone())),
            Arc::new(ScoreRepository::new(pool)),
        )
    }
}

#[async_trait]
impl ScoringStore for PgScoringStore {
    async fn find_race(&self, race_id: Uuid) -> StoreResult<Option<Race>> {
        Ok(self.race_repo.find_by_id(race_id).await?)
    }

    async fn find_result(&self, race_id: Uuid) -> StoreResult<Option<RaceResult>> {
        Ok(self.race_repo.find_result(race_id).await?)
    }

    async fn active_rulesets(&self, pool_id: Uuid) -> StoreResult<Vec<Ruleset>> {
        Ok(self.ruleset_repo.find_active_by_pool(pool_id).await?)
    }

    async fn predictions_for_race(&self, race_id: Uuid) -> StoreResult<Vec<Prediction>> {
        Ok(self.prediction_repo.find_by_race(race_id).await?)
    }

    async fn upsert_score(&self, score: &NewScore) -> StoreResult<UpsertOutcome> {
        Ok(self.score_repo.upsert(score).await?)
    }
}
