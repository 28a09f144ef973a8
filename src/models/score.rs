use super::ruleset::Modality;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One matched official position.
///
/// Only matched positions produce an entry: a missing position means the
/// participant did not back that entry, while `points == 0` means it was
/// backed but the ruleset awards nothing for that position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// 0-based official position (0 = winner)
    pub position: usize,
    pub entry_id: Uuid,
    /// Modality of the pick that backed this entry
    pub modality: Modality,
    pub points: i32,
    /// True when the winner position paid the exclusive-winner bonus
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclusive: bool,
}

/// Persisted score of one participant on one race
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Score {
    pub id: Uuid,
    pub race_id: Uuid,
    pub participant_id: Uuid,
    pub points_total: i32,
    pub breakdown: Json<Vec<BreakdownEntry>>,
    pub ruleset_version: i32,
    pub computed_at: NaiveDateTime,
}

/// Score as produced by the engine, before it is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScore {
    pub race_id: Uuid,
    pub participant_id: Uuid,
    pub points_total: i32,
    pub breakdown: Vec<BreakdownEntry>,
    pub ruleset_version: i32,
}

/// Whether an upsert inserted a new row or overwrote the existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Aggregated points of a participant across a pool
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Standing {
    pub participant_id: Uuid,
    pub display_name: String,
    pub points_total: i64,
    pub races_scored: i64,
}
