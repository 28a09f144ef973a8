//! Pure scoring core.
//!
//! Nothing in this module performs I/O: the orchestrator in
//! `services::recompute` loads inputs, runs these steps and persists the
//! result.

pub mod calculator;
pub mod exclusivity;
pub mod picks;
pub mod rules;

pub use calculator::{calculate, ScoreCard};
pub use exclusivity::count_winner_backers;
pub use picks::{normalize, normalize_with, NormalizedPick, NormalizedPicks};
pub use rules::{resolve_active, ScoringRules};
