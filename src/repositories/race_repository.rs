use crate::error::RepositoryError;
use crate::models::{Race, RaceEntry, RaceResult, RaceStatus};
use chrono::NaiveDate;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for races, their entries and official results
pub struct RaceRepository {
    pool: PgPool,
}

impl RaceRepository {
    /// Create a new RaceRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new scheduled race
    pub async fn create(
        &self,
        pool_id: Uuid,
        seq: i32,
        race_date: Option<NaiveDate>,
    ) -> SqlxResult<Race> {
        sqlx::query_as::<_, Race>(
            r#"
            INSERT INTO races (pool_id, seq, race_date)
            VALUES ($1, $2, $3)
            RETURNING id, pool_id, seq, status, race_date, created_at
            "#,
        )
        .bind(pool_id)
        .bind(seq)
        .bind(race_date)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a race by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<Race>> {
        sqlx::query_as::<_, Race>(
            r#"
            SELECT id, pool_id, seq, status, race_date, created_at
            FROM races
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Published races of a pool in `seq` order, optionally for one day
    pub async fn find_published_by_pool(
        &self,
        pool_id: Uuid,
        race_date: Option<NaiveDate>,
    ) -> SqlxResult<Vec<Race>> {
        sqlx::query_as::<_, Race>(
            r#"
            SELECT id, pool_id, seq, status, race_date, created_at
            FROM races
            WHERE pool_id = $1
              AND status = 'result_published'
              AND ($2::DATE IS NULL OR race_date = $2)
            ORDER BY seq ASC
            "#,
        )
        .bind(pool_id)
        .bind(race_date)
        .fetch_all(&self.pool)
        .await
    }

    /// Move a race one step forward in its lifecycle; skips and backward moves are rejected
    pub async fn advance_status(&self, id: Uuid, next: RaceStatus) -> Result<Race, RepositoryError> {
        let race = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Race {} not found", id)))?;

        let current = race.status_enum().map_err(RepositoryError::InvalidInput)?;
        if !current.can_transition_to(next) {
            return Err(RepositoryError::InvalidInput(format!(
                "Race {} cannot move from {} to {}",
                id,
                current.as_str(),
                next.as_str()
            )));
        }

        let race = sqlx::query_as::<_, Race>(
            r#"
            UPDATE races
            SET status = $2
            WHERE id = $1 AND status = $3
            RETURNING id, pool_id, seq, status, race_date, created_at
            "#,
        )
        .bind(id)
        .bind(next.as_str())
        .bind(current.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::Duplicate(format!("Race {} changed concurrently", id)))?;

        Ok(race)
    }

    /// Add an entry to a race
    pub async fn create_entry(
        &self,
        race_id: Uuid,
        program_number: i32,
        label: &str,
    ) -> SqlxResult<RaceEntry> {
        sqlx::query_as::<_, RaceEntry>(
            r#"
            INSERT INTO race_entries (race_id, program_number, label)
            VALUES ($1, $2, $3)
            RETURNING id, race_id, program_number, label
            "#,
        )
        .bind(race_id)
        .bind(program_number)
        .bind(label)
        .fetch_one(&self.pool)
        .await
    }


    /// Find the official result of a race
    pub async fn find_result(&self, race_id: Uuid) -> SqlxResult<Option<RaceResult>> {
        sqlx::query_as::<_, RaceResult>(
            r#"
            SELECT race_id, official_order, published_at
            FROM race_results
            WHERE race_id = $1
            "#,
        )
        .bind(race_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Record (or correct) the official order of a race
    pub async fn save_result(&self, race_id: Uuid, official_order: &[Uuid]) -> SqlxResult<RaceResult> {
        sqlx::query_as::<_, RaceResult>(
            r#"
            INSERT INTO race_results (race_id, official_order)
            VALUES ($1, $2)
            ON CONFLICT (race_id) DO UPDATE
            SET official_order = EXCLUDED.official_order, published_at = NOW()
            RETURNING race_id, official_order, published_at
            "#,
        )
        .bind(race_id)
        .bind(official_order)
        .fetch_one(&self.pool)
        .await
    }
}
