use crate::error::RepositoryError;
use crate::models::{NewRuleset, Ruleset};
use sqlx::{PgPool, Result as SqlxResult};
use tracing::info;
use uuid::Uuid;

const RULESET_COLUMNS: &str = r#"
    id, pool_id, version,
    points_first, points_second, points_third, points_fourth,
    exclusive_winner_points, modalities_enabled, is_active, created_at
"#;

/// Repository for versioned rulesets
pub struct RulesetRepository {
    pool: PgPool,
}

impl RulesetRepository {
    /// Create a new RulesetRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All rows marked active for a pool. More than one row is a consistency
    /// violation the caller must surface.
    pub async fn find_active_by_pool(&self, pool_id: Uuid) -> SqlxResult<Vec<Ruleset>> {
        sqlx::query_as::<_, Ruleset>(&format!(
            "SELECT {RULESET_COLUMNS} FROM rulesets WHERE pool_id = $1 AND is_active ORDER BY version DESC"
        ))
        .bind(pool_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Full version history of a pool, newest first
    pub async fn find_by_pool(&self, pool_id: Uuid) -> SqlxResult<Vec<Ruleset>> {
        sqlx::query_as::<_, Ruleset>(&format!(
            "SELECT {RULESET_COLUMNS} FROM rulesets WHERE pool_id = $1 ORDER BY version DESC"
        ))
        .bind(pool_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Publish the next ruleset version and make it the only active one.
    ///
    /// The previous active row is deactivated, never rewritten, so older
    /// versions stay available for audit.
    pub async fn publish_version(
        &self,
        pool_id: Uuid,
        new_ruleset: NewRuleset,
    ) -> Result<Ruleset, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Serialise concurrent publishers on the pool row
        sqlx::query("SELECT id FROM pools WHERE id = $1 FOR UPDATE")
            .bind(pool_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Pool {} not found", pool_id)))?;

        let next_version: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM rulesets WHERE pool_id = $1",
        )
        .bind(pool_id)
        .fetch_one(&mut *tx)
        .await?;

        let candidate = new_ruleset.into_ruleset(pool_id, next_version);
        candidate.validate().map_err(RepositoryError::InvalidInput)?;

        sqlx::query("UPDATE rulesets SET is_active = FALSE WHERE pool_id = $1 AND is_active")
            .bind(pool_id)
            .execute(&mut *tx)
            .await?;

        let ruleset = sqlx::query_as::<_, Ruleset>(&format!(
            r#"
            INSERT INTO rulesets (
                pool_id, version, points_first, points_second, points_third, points_fourth,
                exclusive_winner_points, modalities_enabled, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            RETURNING {RULESET_COLUMNS}
            "#
        ))
        .bind(pool_id)
        .bind(candidate.version)
        .bind(candidate.points_first)
        .bind(candidate.points_second)
        .bind(candidate.points_third)
        .bind(candidate.points_fourth)
        .bind(candidate.exclusive_winner_points)
        .bind(&candidate.modalities_enabled)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Published ruleset v{} for pool {}", ruleset.version, pool_id);
        Ok(ruleset)
    }
}
