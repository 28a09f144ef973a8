use crate::models::{Membership, Pool};
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for pools and their memberships
pub struct PoolRepository {
    pool: PgPool,
}

impl PoolRepository {
    /// Create a new PoolRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new pool
    pub async fn create(&self, slug: &str, name: &str) -> SqlxResult<Pool> {
        sqlx::query_as::<_, Pool>(
            r#"
            INSERT INTO pools (slug, name)
            VALUES ($1, $2)
            RETURNING id, slug, name, created_at
            "#,
        )
        .bind(slug)
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a pool by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<Pool>> {
        sqlx::query_as::<_, Pool>(
            r#"
            SELECT id, slug, name, created_at
            FROM pools
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }


    /// Add an account-backed member
    pub async fn add_account_member(&self, pool_id: Uuid, account_ref: &str) -> SqlxResult<Membership> {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (pool_id, account_ref)
            VALUES ($1, $2)
            RETURNING id, pool_id, account_ref, guest_name, joined_at
            "#,
        )
        .bind(pool_id)
        .bind(account_ref)
        .fetch_one(&self.pool)
        .await
    }

    /// Add a guest member identified only by name
    pub async fn add_guest_member(&self, pool_id: Uuid, guest_name: &str) -> SqlxResult<Membership> {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (pool_id, guest_name)
            VALUES ($1, $2)
            RETURNING id, pool_id, account_ref, guest_name, joined_at
            "#,
        )
        .bind(pool_id)
        .bind(guest_name)
        .fetch_one(&self.pool)
        .await
    }

    /// Find all members of a pool
    pub async fn find_members(&self, pool_id: Uuid) -> SqlxResult<Vec<Membership>> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, pool_id, account_ref, guest_name, joined_at
            FROM memberships
            WHERE pool_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(pool_id)
        .fetch_all(&self.pool)
        .await
    }
}
