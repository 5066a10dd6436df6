// handlers/users/create.rs - POST /users/create handler
use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::user_service::{CreateUserInput, UserService};

/// POST /users/create - Create a new user record
///
/// Expected input: `{ "full_name": "...", "mob_num": "...", "pan_num": "...",
/// "manager_id": "..." }` with manager_id optional. The mobile number is
/// normalized (leading 0 or +91 stripped) and the PAN uppercased before
/// validation.
pub async fn create_user(
    body: Option<Json<CreateUserInput>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(input) = body.ok_or_else(|| ApiError::bad_request("Request body is missing."))?;

    let service = UserService::new().await?;
    let user_id = service.create_user(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "Success",
            "message": format!("User created successfully with ID: {}", user_id),
        })),
    ))
}
