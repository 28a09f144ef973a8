use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Pool membership. The engine addresses participants by `id` only,
/// whether the member is backed by an account or is a named guest.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub account_ref: Option<String>,
    pub guest_name: Option<String>,
    pub joined_at: NaiveDateTime,
}

impl Membership {
    /// Name shown in standings
    pub fn display_name(&self) -> &str {
        self.guest_name
            .as_deref()
            .or(self.account_ref.as_deref())
            .unwrap_or("unknown")
    }

    pub fn is_guest(&self) -> bool {
        self.guest_name.is_some()
    }
}
