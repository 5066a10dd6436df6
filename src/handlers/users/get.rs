// handlers/users/get.rs - POST /users/get handler
use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::user_service::{GetUsersInput, UserService};

/// POST /users/get - Retrieve users by optional filter
///
/// The body may carry `user_id`, `mob_num`, or `manager_id`; the first one
/// present (in that order) wins. No body, or no filter field, returns every
/// row including inactive history rows.
pub async fn get_users(
    body: Option<Json<GetUsersInput>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = body.map(|Json(input)| input).unwrap_or_default();

    let service = UserService::new().await?;
    let users = service.get_users(input).await?;

    Ok((StatusCode::OK, Json(json!({ "users": users }))))
}
