use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Pool ("penca") running a shared prediction competition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pool {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}
