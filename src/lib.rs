//! Penca Scoring Library
//!
//! Scoring engine for a horse-racing prediction pool: turns the official
//! finishing order of a race and the predictions submitted for it into one
//! score row per participant.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod scoring;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult, RepositoryError, ScoringError};

use repositories::*;
use services::{BatchRunner, ScoringService};
use std::sync::Arc;
use store::PgScoringStore;

/// Application state containing all repositories and services
pub struct AppState {
    pub pool_repo: Arc<PoolRepository>,
    pub race_repo: Arc<RaceRepository>,
    pub ruleset_repo: Arc<RulesetRepository>,
    pub prediction_repo: Arc<PredictionRepository>,
    pub score_repo: Arc<ScoreRepository>,
    pub scoring_service: Arc<ScoringService>,
}

impl AppState {
    /// Create a new AppState with initialized repositories
    pub fn new(pool: sqlx::PgPool) -> Self {
        let race_repo = Arc::new(RaceRepository::new(pool.clone()));
        let ruleset_repo = Arc::new(RulesetRepository::new(pool.clone()));
        let prediction_repo = Arc::new(PredictionRepository::new(pool.clone()));
        let score_repo = Arc::new(ScoreRepository::new(pool.clone()));

        let store = PgScoringStore::new(
            race_repo.clone(),
            ruleset_repo.clone(),
            prediction_repo.clone(),
            score_repo.clone(),
        );

        Self {
            pool_repo: Arc::new(PoolRepository::new(pool)),
            race_repo,
            ruleset_repo,
            prediction_repo,
            score_repo,
            scoring_service: Arc::new(ScoringService::new(Arc::new(store))),
        }
    }

    /// Batch runner over the shared scoring service
    pub fn batch_runner(&self, concurrency: usize) -> BatchRunner {
        BatchRunner::new(self.scoring_service.clone(), concurrency)
    }
}
