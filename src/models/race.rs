use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Race status. Transitions are forward-only:
/// scheduled -> closed -> result_published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    Scheduled,
    Closed,
    ResultPublished,
}

impl RaceStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(RaceStatus::Scheduled),
            "closed" => Ok(RaceStatus::Closed),
            "result_published" => Ok(RaceStatus::ResultPublished),
            _ => Err(format!("Invalid race status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceStatus::Scheduled => "scheduled",
            RaceStatus::Closed => "closed",
            RaceStatus::ResultPublished => "result_published",
        }
    }

    /// Only the immediate successor is allowed
    pub fn can_transition_to(&self, next: RaceStatus) -> bool {
        matches!(
            (self, next),
            (RaceStatus::Scheduled, RaceStatus::Closed)
                | (RaceStatus::Closed, RaceStatus::ResultPublished)
        )
    }
}

impl From<RaceStatus> for String {
    fn from(status: RaceStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Race within a pool, ordered by `seq`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Race {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub seq: i32,
    pub status: String, // Stored as TEXT, use RaceStatus enum for type safety
    pub race_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl Race {
    /// Get status as an enum; unknown values are an error, never a default
    pub fn status_enum(&self) -> Result<RaceStatus, String> {
        RaceStatus::from_str(&self.status)
    }

    /// Check if the official result has been published
    pub fn is_result_published(&self) -> bool {
        self.status_enum() == Ok(RaceStatus::ResultPublished)
    }
}

/// Competitor (horse) in a race
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RaceEntry {
    pub id: Uuid,
    pub race_id: Uuid,
    pub program_number: i32,
    pub label: String,
}
