pub mod pool_repository;
pub mod prediction_repository;
pub mod race_repository;
pub mod ruleset_repository;
pub mod score_repository;

// Re-export all repositories for convenient access
pub use pool_repository::PoolRepository;
pub use prediction_repository::PredictionRepository;
pub use race_repository::RaceRepository;
pub use ruleset_repository::RulesetRepository;
pub use score_repository::ScoreRepository;
