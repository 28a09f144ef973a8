use crate::models::Prediction;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for participant predictions
pub struct PredictionRepository {
    pool: PgPool,
}

impl PredictionRepository {
    /// Create a new PredictionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit or replace a participant's picks. Locked predictions are left
    /// untouched and `None` is returned.
    pub async fn submit(
        &self,
        race_id: Uuid,
        participant_id: Uuid,
        winner_pick: Option<Uuid>,
        exacta_pick: Option<&[Uuid]>,
        trifecta_pick: Option<&[Uuid]>,
    ) -> SqlxResult<Option<Prediction>> {
        sqlx::query_as::<_, Prediction>(
            r#"
            INSERT INTO predictions (race_id, participant_id, winner_pick, exacta_pick, trifecta_pick)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (race_id, participant_id) DO UPDATE
            SET winner_pick = EXCLUDED.winner_pick,
                exacta_pick = EXCLUDED.exacta_pick,
                trifecta_pick = EXCLUDED.trifecta_pick,
                updated_at = NOW()
            WHERE NOT predictions.is_locked
            RETURNING id, race_id, participant_id, winner_pick, exacta_pick,
                      trifecta_pick, is_locked, updated_at
            "#,
        )
        .bind(race_id)
        .bind(participant_id)
        .bind(winner_pick)
        .bind(exacta_pick)
        .bind(trifecta_pick)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find all predictions for a race
    pub async fn find_by_race(&self, race_id: Uuid) -> SqlxResult<Vec<Prediction>> {
        sqlx::query_as::<_, Prediction>(
            r#"
            SELECT id, race_id, participant_id, winner_pick, exacta_pick,
                   trifecta_pick, is_locked, updated_at
            FROM predictions
            WHERE race_id = $1
            ORDER BY updated_at ASC
            "#,
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Lock every prediction of a race, returning how many rows changed
    pub async fn lock_race(&self, race_id: Uuid) -> SqlxResult<u64> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE predictions
            SET is_locked = TRUE
            WHERE race_id = $1 AND NOT is_locked
            "#,
        )
        .bind(race_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }
}
