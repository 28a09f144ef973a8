use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;
use uuid::Uuid;

/// Official result of a published race.
/// `official_order[0]` is the winner, then second, third and fourth.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RaceResult {
    pub race_id: Uuid,
    pub official_order: Vec<Uuid>,
    pub published_at: NaiveDateTime,
}

impl RaceResult {
    pub fn new(race_id: Uuid, official_order: Vec<Uuid>) -> Self {
        Self {
            race_id,
            official_order,
            published_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn winner(&self) -> Option<Uuid> {
        self.official_order.first().copied()
    }

    /// First entry listed more than once, if any
    pub fn first_duplicate(&self) -> Option<Uuid> {
        let mut seen = HashSet::new();
        self.official_order
            .iter()
            .copied()
            .find(|entry_id| !seen.insert(*entry_id))
    }
}
