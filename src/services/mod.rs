pub mod batch;
pub mod recompute;

pub use batch::{BatchReport, BatchRunner, RaceOutcome};
pub use recompute::{ParticipantFailure, PreparedRace, RecomputeReport, ScoringService};
