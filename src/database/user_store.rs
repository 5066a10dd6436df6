//! Parameterized queries against the `users` and `managers` tables. All
//! functions take a `PgConnection` so callers can run them against a pool
//! connection or inside a transaction.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::database::manager::StoreError;
use crate::database::models::user::{Manager, User};

const SELECT_COLUMNS: &str =
    "user_id, full_name, mob_num, pan_num, manager_id, created_at, updated_at, is_active";

/// Filter for user lookups. Matches the request precedence: id, then mobile,
/// then manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    All,
    ById(String),
    ByMobile(String),
    ByManager(String),
}

/// Identifies delete targets; deletes remove every matching row, history
/// included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    ById(String),
    ByMobile(String),
}

/// Non-manager columns applied to the active row of a lineage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserColumnUpdate {
    pub full_name: Option<String>,
    pub mob_num: Option<String>,
    pub pan_num: Option<String>,
}

impl UserColumnUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.mob_num.is_none() && self.pan_num.is_none()
    }
}

pub async fn insert_user(conn: &mut PgConnection, user: &User) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO users (user_id, full_name, mob_num, pan_num, manager_id, created_at, updated_at, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(&user.user_id)
    .bind(&user.full_name)
    .bind(&user.mob_num)
    .bind(&user.pan_num)
    .bind(&user.manager_id)
    .bind(user.created_at)
    .bind(user.updated_at)
    .bind(user.is_active)
    .execute(conn)
    .await?;
    Ok(())
}

/// Existence-only lookup against the managers table.
pub async fn manager_exists(conn: &mut PgConnection, manager_id: &str) -> Result<bool, StoreError> {
    let row: Option<Manager> =
        sqlx::query_as("SELECT manager_id FROM managers WHERE manager_id = $1")
            .bind(manager_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}

/// Checks for any row with this user_id, active or not.
pub async fn user_exists(conn: &mut PgConnection, user_id: &str) -> Result<bool, StoreError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT user_id FROM users WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

pub async fn find_users(
    conn: &mut PgConnection,
    filter: &UserFilter,
) -> Result<Vec<User>, StoreError> {
    let (sql, param) = match filter {
        UserFilter::All => (format!("SELECT {SELECT_COLUMNS} FROM users"), None),
        UserFilter::ById(id) => (
            format!("SELECT {SELECT_COLUMNS} FROM users WHERE user_id = $1"),
            Some(id),
        ),
        UserFilter::ByMobile(mob) => (
            format!("SELECT {SELECT_COLUMNS} FROM users WHERE mob_num = $1"),
            Some(mob),
        ),
        UserFilter::ByManager(mgr) => (
            format!("SELECT {SELECT_COLUMNS} FROM users WHERE manager_id = $1"),
            Some(mgr),
        ),
    };

    let mut query = sqlx::query_as::<_, User>(&sql);
    if let Some(value) = param {
        query = query.bind(value);
    }
    Ok(query.fetch_all(conn).await?)
}

/// Deletes every row matching the target and returns the affected count.
pub async fn delete_users(
    conn: &mut PgConnection,
    target: &DeleteTarget,
) -> Result<u64, StoreError> {
    let result = match target {
        DeleteTarget::ById(id) => {
            sqlx::query("DELETE FROM users WHERE user_id = $1")
                .bind(id)
                .execute(conn)
                .await?
        }
        DeleteTarget::ByMobile(mob) => {
            sqlx::query("DELETE FROM users WHERE mob_num = $1")
                .bind(mob)
                .execute(conn)
                .await?
        }
    };
    Ok(result.rows_affected())
}

/// Reads the active row's manager for a user_id. Outer `None` means no active
/// row exists; inner `None` means the active row has no manager yet.
pub async fn active_manager(
    conn: &mut PgConnection,
    user_id: &str,
) -> Result<Option<Option<String>>, StoreError> {
    let row = sqlx::query_scalar::<_, Option<String>>(
        "SELECT manager_id FROM users WHERE user_id = $1 AND is_active = true",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Bootstrap path: sets the first manager on the active row in place.
pub async fn assign_manager_in_place(
    conn: &mut PgConnection,
    user_id: &str,
    manager_id: &str,
    updated_at: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE users SET manager_id = $1, updated_at = $2 WHERE user_id = $3 AND is_active = true",
    )
    .bind(manager_id)
    .bind(updated_at)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Marks the active row inactive. The manager filter guards against the
/// manager having changed between the read and this write.
pub async fn deactivate_user(
    conn: &mut PgConnection,
    user_id: &str,
    current_manager_id: &str,
) -> Result<u64, StoreError> {
    let result = sqlx::query(
        "UPDATE users SET is_active = false WHERE user_id = $1 AND manager_id = $2 AND is_active = true",
    )
    .bind(user_id)
    .bind(current_manager_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Inserts the forked row of a lineage: fresh user_id and manager, identity
/// fields and created_at copied from the row just deactivated.
pub async fn fork_user(
    conn: &mut PgConnection,
    old_user_id: &str,
    new_user_id: &str,
    new_manager_id: &str,
    updated_at: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO users (user_id, full_name, mob_num, pan_num, manager_id, created_at, updated_at, is_active) \
         SELECT $1, full_name, mob_num, pan_num, $2, created_at, $3, true \
         FROM users WHERE user_id = $4 AND is_active = false",
    )
    .bind(new_user_id)
    .bind(new_manager_id)
    .bind(updated_at)
    .bind(old_user_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Applies non-manager field changes to the active row, refreshing updated_at.
pub async fn update_active_columns(
    conn: &mut PgConnection,
    user_id: &str,
    changes: &UserColumnUpdate,
    updated_at: DateTime<Utc>,
) -> Result<(), StoreError> {
    let (sql, id_position) = build_update_sql(changes);

    let mut query = sqlx::query(&sql);
    if let Some(full_name) = &changes.full_name {
        query = query.bind(full_name);
    }
    if let Some(mob_num) = &changes.mob_num {
        query = query.bind(mob_num);
    }
    if let Some(pan_num) = &changes.pan_num {
        query = query.bind(pan_num);
    }
    query = query.bind(updated_at);
    debug_assert!(id_position >= 2);
    query.bind(user_id).execute(conn).await?;
    Ok(())
}

/// Builds the dynamic SET clause; returns the SQL and the placeholder index
/// used for the user_id.
fn build_update_sql(changes: &UserColumnUpdate) -> (String, usize) {
    let mut sets = Vec::new();
    let mut idx = 1;
    if changes.full_name.is_some() {
        sets.push(format!("full_name = ${idx}"));
        idx += 1;
    }
    if changes.mob_num.is_some() {
        sets.push(format!("mob_num = ${idx}"));
        idx += 1;
    }
    if changes.pan_num.is_some() {
        sets.push(format!("pan_num = ${idx}"));
        idx += 1;
    }
    sets.push(format!("updated_at = ${idx}"));
    idx += 1;

    let sql = format!(
        "UPDATE users SET {} WHERE user_id = ${} AND is_active = true",
        sets.join(", "),
        idx
    );
    (sql, idx)
}
