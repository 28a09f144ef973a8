//! Read/write surface the scoring engine needs from persistence.
//!
//! The orchestrator only talks to `ScoringStore`, so it can run against
//! Postgres in production and against `MemoryStore` in tests.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgScoringStore;

use crate::error::RepositoryError;
use crate::models::{NewScore, Prediction, Race, RaceResult, Ruleset, UpsertOutcome};
use async_trait::async_trait;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait ScoringStore: Send + Sync {
    async fn find_race(&self, race_id: Uuid) -> StoreResult<Option<Race>>;

    async fn find_result(&self, race_id: Uuid) -> StoreResult<Option<RaceResult>>;

    /// Every ruleset row marked active for the pool
    async fn active_rulesets(&self, pool_id: Uuid) -> StoreResult<Vec<Ruleset>>;

    async fn predictions_for_race(&self, race_id: Uuid) -> StoreResult<Vec<Prediction>>;

    /// Insert or overwrite the score keyed by (race_id, participant_id)
    async fn upsert_score(&self, score: &NewScore) -> StoreResult<UpsertOutcome>;
}
