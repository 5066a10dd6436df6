//! Manager reassignment with in-table history. Changing a user's manager does
//! not mutate the assignment in place: the active row is deactivated and a new
//! row is forked under the new manager, so every past assignment survives as
//! an immutable inactive row sharing the person's identity fields.
//!
//! The only exception is the bootstrap path: a user who has never had a
//! manager gets the first assignment written into the existing active row.

use chrono::Utc;
use sqlx::PgConnection;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::manager::StoreError;
use crate::database::user_store;

/// How a reassignment request is applied to the active row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// Active row has no manager yet: first assignment, updated in place.
    UpdateInPlace,
    /// Active row already has a manager: deactivate it and fork a new row.
    Fork { current_manager_id: String },
}

/// Decides between the two reassignment paths from the active row's current
/// manager. Pure so the invariant (null manager updates in place, anything
/// else forks) is testable without SQL.
pub fn decide(current_manager: Option<&str>) -> AssignmentOutcome {
    match current_manager {
        None => AssignmentOutcome::UpdateInPlace,
        Some(current) => AssignmentOutcome::Fork {
            current_manager_id: current.to_string(),
        },
    }
}

/// Reassigns `user_id` to `new_manager_id` within the caller's transaction.
///
/// The caller is responsible for committing; nothing here is durable until it
/// does. `new_manager_id` must already be validated against the managers
/// table. Returns the outcome that was applied.
///
/// Reassigning to the manager the user already has still forks a new row;
/// the protocol is deliberately not idempotent so the history records the
/// reassignment request itself.
pub async fn reassign(
    conn: &mut PgConnection,
    user_id: &str,
    new_manager_id: &str,
) -> Result<AssignmentOutcome, StoreError> {
    let current = user_store::active_manager(conn, user_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("No active user with id {user_id}")))?;

    let outcome = decide(current.as_deref());
    match &outcome {
        AssignmentOutcome::UpdateInPlace => {
            user_store::assign_manager_in_place(conn, user_id, new_manager_id, Utc::now()).await?;
            debug!(%user_id, %new_manager_id, "assigned first manager in place");
        }
        AssignmentOutcome::Fork { current_manager_id } => {
            // The deactivate is filtered on the manager we read at step one,
            // so a concurrent reassignment makes it a no-op.
            let deactivated =
                user_store::deactivate_user(conn, user_id, current_manager_id).await?;
            if !guard_held(deactivated) {
                warn!(
                    %user_id,
                    %current_manager_id,
                    "manager changed between read and write; fork skipped"
                );
                return Ok(outcome);
            }

            let new_user_id = Uuid::new_v4().to_string();
            user_store::fork_user(conn, user_id, &new_user_id, new_manager_id, Utc::now()).await?;
            debug!(%user_id, %new_user_id, %new_manager_id, "forked user row under new manager");
        }
    }

    Ok(outcome)
}

/// The fork may only proceed when the guarded deactivate actually hit the
/// row read at step one.
fn guard_held(deactivated_rows: u64) -> bool {
    deactivated_rows > 0
}
