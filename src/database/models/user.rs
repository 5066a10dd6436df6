use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `users` table. A logical person is represented by a lineage
/// of rows sharing identity fields: at most one row per lineage is active at a
/// time, and inactive rows are immutable manager-assignment history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: String,
    pub full_name: String,
    pub mob_num: String,
    pub pan_num: String,
    pub manager_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Existence-only row of the `managers` lookup table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Manager {
    pub manager_id: String,
}
