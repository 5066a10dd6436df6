// handlers/users/delete.rs - POST /users/delete handler
use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::user_service::{DeleteUserInput, UserService};

/// POST /users/delete - Delete a user by user_id or mob_num
///
/// Removes every matching row, history rows included. Responds 404 when
/// nothing matched and 400 when neither identifier is given.
pub async fn delete_user(
    body: Option<Json<DeleteUserInput>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(input) = body.ok_or_else(|| ApiError::bad_request("Request body is missing."))?;

    let service = UserService::new().await?;
    service.delete_user(input).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "Success",
            "message": "User deleted successfully.",
        })),
    ))
}
