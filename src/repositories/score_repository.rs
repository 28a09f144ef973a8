use crate::models::{NewScore, Score, Standing, UpsertOutcome};
use sqlx::types::Json;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for score rows. Writes go through `upsert` only.
pub struct ScoreRepository {
    pool: PgPool,
}

impl ScoreRepository {
    /// Create a new ScoreRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite the score of one (race, participant) pair.
    ///
    /// Relies on the `scores_race_participant_key` unique constraint, so two
    /// concurrent writers for the same pair converge on one row.
    pub async fn upsert(&self, score: &NewScore) -> SqlxResult<UpsertOutcome> {
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO scores (race_id, participant_id, points_total, breakdown, ruleset_version)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (race_id, participant_id) DO UPDATE
            SET points_total = EXCLUDED.points_total,
                breakdown = EXCLUDED.breakdown,
                ruleset_version = EXCLUDED.ruleset_version,
                computed_at = NOW()
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(score.race_id)
        .bind(score.participant_id)
        .bind(score.points_total)
        .bind(Json(&score.breakdown))
        .bind(score.ruleset_version)
        .fetch_one(&self.pool)
        .await?;

        Ok(if inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    /// Find all scores of a race
    pub async fn find_by_race(&self, race_id: Uuid) -> SqlxResult<Vec<Score>> {
        sqlx::query_as::<_, Score>(
            r#"
            SELECT id, race_id, participant_id, points_total, breakdown,
                   ruleset_version, computed_at
            FROM scores
            WHERE race_id = $1
            ORDER BY points_total DESC, participant_id ASC
            "#,
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Find the score of one participant on one race
    pub async fn find_by_race_and_participant(
        &self,
        race_id: Uuid,
        participant_id: Uuid,
    ) -> SqlxResult<Option<Score>> {
        sqlx::query_as::<_, Score>(
            r#"
            SELECT id, race_id, participant_id, points_total, breakdown,
                   ruleset_version, computed_at
            FROM scores
            WHERE race_id = $1 AND participant_id = $2
            "#,
        )
        .bind(race_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Get score row count for a race
    pub async fn count_by_race(&self, race_id: Uuid) -> SqlxResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM scores WHERE race_id = $1")
            .bind(race_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Points per member across every scored race of a pool
    pub async fn standings(&self, pool_id: Uuid) -> SqlxResult<Vec<Standing>> {
        sqlx::query_as::<_, Standing>(
            r#"
            SELECT m.id AS participant_id,
                   COALESCE(m.guest_name, m.account_ref, 'unknown') AS display_name,
                   COALESCE(SUM(s.points_total), 0)::BIGINT AS points_total,
                   COUNT(s.id) AS races_scored
            FROM memberships m
            LEFT JOIN scores s ON s.participant_id = m.id
            WHERE m.pool_id = $1
            GROUP BY m.id, m.guest_name, m.account_ref
            ORDER BY points_total DESC, display_name ASC
            "#,
        )
        .bind(pool_id)
        .fetch_all(&self.pool)
        .await
    }
}
