// handlers/users/update.rs - POST /users/update handler
use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::user_service::{BatchUpdateReport, UpdateUsersInput, UserService};

/// POST /users/update - Batch update users
///
/// Expected input: `{ "user_ids": [...], "update_data": { user_id: fields } }`.
/// Unknown ids are skipped and reported; an invalid field on any found user
/// aborts the whole batch with a 400 and nothing is committed. A manager_id
/// field triggers the history-preserving reassignment protocol.
pub async fn update_users(
    body: Option<Json<UpdateUsersInput>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(input) = body.ok_or_else(|| ApiError::bad_request("Request body is missing."))?;

    let service = UserService::new().await?;
    let report = service.update_users(input).await?;

    Ok((StatusCode::OK, Json(response_body(&report))))
}

/// A clean batch is a plain success; skipped ids downgrade it to a partial
/// success carrying the ids as one comma-joined string.
fn response_body(report: &BatchUpdateReport) -> Value {
    if report.skipped_users.is_empty() {
        json!({
            "status": "Success",
            "message": "Users updated successfully.",
        })
    } else {
        json!({
            "status": "Partial Success",
            "message": "Users updated successfully.",
            "skipped_users": report.skipped_users.join(", "),
        })
    }
}
