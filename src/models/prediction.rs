use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A participant's picks for one race
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Prediction {
    pub id: Uuid,
    pub race_id: Uuid,
    pub participant_id: Uuid,
    pub winner_pick: Option<Uuid>,
    pub exacta_pick: Option<Vec<Uuid>>,
    pub trifecta_pick: Option<Vec<Uuid>>,
    pub is_locked: bool,
    pub updated_at: NaiveDateTime,
}

impl Prediction {
    /// Create an empty, unlocked prediction
    pub fn new(race_id: Uuid, participant_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            race_id,
            participant_id,
            winner_pick: None,
            exacta_pick: None,
            trifecta_pick: None,
            is_locked: false,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn with_winner(mut self, entry_id: Uuid) -> Self {
        self.winner_pick = Some(entry_id);
        self
    }

    pub fn with_exacta(mut self, entry_ids: Vec<Uuid>) -> Self {
        self.exacta_pick = Some(entry_ids);
        self
    }

    pub fn with_trifecta(mut self, entry_ids: Vec<Uuid>) -> Self {
        self.trifecta_pick = Some(entry_ids);
        self
    }

    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    /// Check if no pick of any modality is present
    pub fn is_empty(&self) -> bool {
        self.winner_pick.is_none()
            && self.exacta_pick.as_ref().map_or(true, |p| p.is_empty())
            && self.trifecta_pick.as_ref().map_or(true, |p| p.is_empty())
    }
}
