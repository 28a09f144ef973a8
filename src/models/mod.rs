//! Domain models for the scoring engine.
//!
//! Row types for the pool-owned entities the engine reads (pools, memberships,
//! rulesets, races, results, predictions) and the score rows it writes.

pub mod membership;
pub mod pool;
pub mod prediction;
pub mod race;
pub mod race_result;
pub mod ruleset;
pub mod score;

// Re-export all models for convenient access
pub use membership::Membership;
pub use pool::Pool;
pub use prediction::Prediction;
pub use race::{Race, RaceEntry, RaceStatus};
pub use race_result::RaceResult;
pub use ruleset::{Modality, ModalitySet, NewRuleset, PositionPoints, Ruleset};
pub use score::{BreakdownEntry, NewScore, Score, Standing, UpsertOutcome};
