//! Orchestration for the user record endpoints: field validation, transaction
//! handling, and the plain-update vs reassignment split for batch updates.

use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::user::User;
use crate::database::user_store::{self, DeleteTarget, UserColumnUpdate, UserFilter};
use crate::error::ApiError;
use crate::services::reassignment;
use crate::validate::{is_valid_mobile, is_valid_pan, normalize_mobile};

const CREATE_FAILED: &str = "An error occurred while creating the user.";
const GET_FAILED: &str = "An error occurred while retrieving users.";
const DELETE_FAILED: &str = "An error occurred while deleting the user.";
const UPDATE_FAILED: &str = "An error occurred while updating users.";

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserInput {
    pub full_name: Option<String>,
    pub mob_num: Option<String>,
    pub pan_num: Option<String>,
    pub manager_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetUsersInput {
    pub user_id: Option<String>,
    pub mob_num: Option<String>,
    pub manager_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteUserInput {
    pub user_id: Option<String>,
    pub mob_num: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUsersInput {
    pub user_ids: Option<Vec<String>>,
    pub update_data: Option<HashMap<String, UserFieldUpdate>>,
}

/// Per-user fields in a batch update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFieldUpdate {
    pub full_name: Option<String>,
    pub mob_num: Option<String>,
    pub pan_num: Option<String>,
    pub manager_id: Option<String>,
}

/// Result of a batch update: ids that were not found and therefore skipped.
#[derive(Debug, Default)]
pub struct BatchUpdateReport {
    pub skipped_users: Vec<String>,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await.map_err(|err| {
            tracing::error!("Failed to connect to the store: {}", err);
            ApiError::internal_server_error("Failed to connect to the database.")
        })?;
        Ok(Self { pool })
    }

    /// Creates an active user row, optionally under a validated manager.
    /// Returns the generated user id.
    pub async fn create_user(&self, input: CreateUserInput) -> Result<String, ApiError> {
        let full_name = input.full_name.unwrap_or_default().trim().to_string();
        if full_name.is_empty() {
            return Err(ApiError::bad_request("Full name is required."));
        }
        let mob_num = validated_mobile(&input.mob_num.unwrap_or_default())?;
        let pan_num = validated_pan(&input.pan_num.unwrap_or_default())?;
        let manager_id = input.manager_id.filter(|m| !m.is_empty());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ApiError::from_store(e.into(), CREATE_FAILED))?;

        if let Some(manager_id) = &manager_id {
            let known = user_store::manager_exists(&mut tx, manager_id)
                .await
                .map_err(|e| ApiError::from_store(e, CREATE_FAILED))?;
            if !known {
                return Err(ApiError::bad_request("Invalid manager ID."));
            }
        }

        let user = User {
            user_id: Uuid::new_v4().to_string(),
            full_name,
            mob_num,
            pan_num,
            manager_id,
            created_at: Utc::now(),
            updated_at: None,
            is_active: true,
        };
        user_store::insert_user(&mut tx, &user)
            .await
            .map_err(|e| ApiError::from_store(e, CREATE_FAILED))?;
        tx.commit()
            .await
            .map_err(|e| ApiError::from_store(e.into(), CREATE_FAILED))?;

        Ok(user.user_id)
    }

    /// Lists users matching the filter; no filter returns everything,
    /// history rows included.
    pub async fn get_users(&self, input: GetUsersInput) -> Result<Vec<User>, ApiError> {
        let filter = filter_from(input);
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| ApiError::from_store(e.into(), GET_FAILED))?;
        user_store::find_users(&mut conn, &filter)
            .await
            .map_err(|e| ApiError::from_store(e, GET_FAILED))
    }

    /// Deletes all rows matching the target, history included.
    pub async fn delete_user(&self, input: DeleteUserInput) -> Result<(), ApiError> {
        let target = delete_target_from(input)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ApiError::from_store(e.into(), DELETE_FAILED))?;
        let deleted = user_store::delete_users(&mut tx, &target)
            .await
            .map_err(|e| ApiError::from_store(e, DELETE_FAILED))?;
        tx.commit()
            .await
            .map_err(|e| ApiError::from_store(e.into(), DELETE_FAILED))?;

        if deleted == 0 {
            return Err(ApiError::not_found("User not found."));
        }
        Ok(())
    }

    /// Batch update. Unknown ids are collected as skipped; any invalid field
    /// on a found user aborts the whole request. Everything runs in one
    /// transaction committed at the end, so an abort rolls back every update
    /// already applied in the loop.
    pub async fn update_users(
        &self,
        input: UpdateUsersInput,
    ) -> Result<BatchUpdateReport, ApiError> {
        let (user_ids, update_data) = validate_batch_request(input)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ApiError::from_store(e.into(), UPDATE_FAILED))?;

        let mut existing = Vec::new();
        let mut skipped = Vec::new();
        for user_id in &user_ids {
            let found = user_store::user_exists(&mut tx, user_id)
                .await
                .map_err(|e| ApiError::from_store(e, UPDATE_FAILED))?;
            if found {
                existing.push(user_id.clone());
            } else {
                skipped.push(user_id.clone());
            }
        }

        for user_id in &existing {
            let Some(fields) = update_data.get(user_id) else {
                continue;
            };
            let plan = validate_field_update(fields)?;

            if let Some(manager_id) = &plan.manager_id {
                let known = user_store::manager_exists(&mut tx, manager_id)
                    .await
                    .map_err(|e| ApiError::from_store(e, UPDATE_FAILED))?;
                if !known {
                    return Err(ApiError::bad_request("Invalid manager ID."));
                }
            }

            // Plain columns land on the active row first so a fork clones the
            // updated values.
            if !plan.columns.is_empty() {
                user_store::update_active_columns(&mut tx, user_id, &plan.columns, Utc::now())
                    .await
                    .map_err(|e| ApiError::from_store(e, UPDATE_FAILED))?;
            }
            if let Some(manager_id) = &plan.manager_id {
                reassignment::reassign(&mut tx, user_id, manager_id)
                    .await
                    .map_err(|e| ApiError::from_store(e, UPDATE_FAILED))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| ApiError::from_store(e.into(), UPDATE_FAILED))?;

        Ok(BatchUpdateReport {
            skipped_users: skipped,
        })
    }
}

fn validated_mobile(raw: &str) -> Result<String, ApiError> {
    let mob_num = normalize_mobile(raw);
    if !is_valid_mobile(&mob_num) {
        return Err(ApiError::bad_request("Invalid mobile number."));
    }
    Ok(mob_num)
}

fn validated_pan(raw: &str) -> Result<String, ApiError> {
    let pan_num = raw.trim().to_uppercase();
    if !is_valid_pan(&pan_num) {
        return Err(ApiError::bad_request("Invalid PAN number."));
    }
    Ok(pan_num)
}

/// Filter precedence: user_id, then mob_num, then manager_id.
fn filter_from(input: GetUsersInput) -> UserFilter {
    if let Some(user_id) = input.user_id {
        UserFilter::ById(user_id)
    } else if let Some(mob_num) = input.mob_num {
        UserFilter::ByMobile(mob_num)
    } else if let Some(manager_id) = input.manager_id {
        UserFilter::ByManager(manager_id)
    } else {
        UserFilter::All
    }
}

fn delete_target_from(input: DeleteUserInput) -> Result<DeleteTarget, ApiError> {
    if let Some(user_id) = input.user_id.filter(|s| !s.is_empty()) {
        Ok(DeleteTarget::ById(user_id))
    } else if let Some(mob_num) = input.mob_num.filter(|s| !s.is_empty()) {
        Ok(DeleteTarget::ByMobile(mob_num))
    } else {
        Err(ApiError::bad_request(
            "Either user_id or mob_num is required.",
        ))
    }
}

type BatchRequest = (Vec<String>, HashMap<String, UserFieldUpdate>);

fn validate_batch_request(input: UpdateUsersInput) -> Result<BatchRequest, ApiError> {
    let user_ids = input.user_ids.unwrap_or_default();
    let update_data = input.update_data.unwrap_or_default();

    if user_ids.is_empty() || update_data.is_empty() {
        return Err(ApiError::bad_request(
            "Both user_ids and update_data are required.",
        ));
    }
    if user_ids.len() != update_data.len() {
        return Err(ApiError::bad_request(
            "The number of user_ids and update_data items should be the same.",
        ));
    }
    Ok((user_ids, update_data))
}

/// A validated per-user update: normalized plain columns plus an optional
/// manager reassignment.
#[derive(Debug, Default)]
struct ValidatedUpdate {
    columns: UserColumnUpdate,
    manager_id: Option<String>,
}

fn validate_field_update(fields: &UserFieldUpdate) -> Result<ValidatedUpdate, ApiError> {
    let mut columns = UserColumnUpdate::default();

    if let Some(raw) = &fields.full_name {
        let full_name = raw.trim().to_string();
        if full_name.is_empty() {
            return Err(ApiError::bad_request("Full name cannot be empty."));
        }
        columns.full_name = Some(full_name);
    }
    if let Some(raw) = &fields.mob_num {
        columns.mob_num = Some(validated_mobile(raw)?);
    }
    if let Some(raw) = &fields.pan_num {
        columns.pan_num = Some(validated_pan(raw)?);
    }
    let manager_id = fields.manager_id.clone().filter(|m| !m.is_empty());

    Ok(ValidatedUpdate {
        columns,
        manager_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_precedence_is_id_mobile_manager() {
        let filter = filter_from(GetUsersInput {
            user_id: Some("u1".into()),
            mob_num: Some("9876543210".into()),
            manager_id: Some("m1".into()),
        });
        assert_eq!(filter, UserFilter::ById("u1".into()));

        let filter = filter_from(GetUsersInput {
            user_id: None,
            mob_num: Some("9876543210".into()),
            manager_id: Some("m1".into()),
        });
        assert_eq!(filter, UserFilter::ByMobile("9876543210".into()));

        let filter = filter_from(GetUsersInput {
            user_id: None,
            mob_num: None,
            manager_id: Some("m1".into()),
        });
        assert_eq!(filter, UserFilter::ByManager("m1".into()));

        assert_eq!(filter_from(GetUsersInput::default()), UserFilter::All);
    }

    #[test]
    fn delete_requires_an_identifier() {
        let err = delete_target_from(DeleteUserInput::default()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Either user_id or mob_num is required.");

        // Empty strings count as missing
        let err = delete_target_from(DeleteUserInput {
            user_id: Some(String::new()),
            mob_num: Some(String::new()),
        })
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn delete_prefers_user_id() {
        let target = delete_target_from(DeleteUserInput {
            user_id: Some("u1".into()),
            mob_num: Some("9876543210".into()),
        })
        .unwrap();
        assert_eq!(target, DeleteTarget::ById("u1".into()));
    }

    #[test]
    fn batch_request_requires_both_fields() {
        let err = validate_batch_request(UpdateUsersInput::default()).unwrap_err();
        assert_eq!(err.message(), "Both user_ids and update_data are required.");

        let err = validate_batch_request(UpdateUsersInput {
            user_ids: Some(vec!["u1".into()]),
            update_data: None,
        })
        .unwrap_err();
        assert_eq!(err.message(), "Both user_ids and update_data are required.");
    }

    #[test]
    fn batch_request_requires_matching_lengths() {
        let mut update_data = HashMap::new();
        update_data.insert("u1".to_string(), UserFieldUpdate::default());

        let err = validate_batch_request(UpdateUsersInput {
            user_ids: Some(vec!["u1".into(), "u2".into()]),
            update_data: Some(update_data),
        })
        .unwrap_err();
        assert_eq!(
            err.message(),
            "The number of user_ids and update_data items should be the same."
        );
    }

    #[test]
    fn invalid_mobile_aborts_with_exact_message() {
        let fields = UserFieldUpdate {
            mob_num: Some("12345".into()),
            ..Default::default()
        };
        let err = validate_field_update(&fields).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid mobile number.");
    }

    #[test]
    fn invalid_pan_aborts_with_exact_message() {
        let fields = UserFieldUpdate {
            pan_num: Some("NOTAPAN".into()),
            ..Default::default()
        };
        let err = validate_field_update(&fields).unwrap_err();
        assert_eq!(err.message(), "Invalid PAN number.");
    }

    #[test]
    fn empty_full_name_is_rejected() {
        let fields = UserFieldUpdate {
            full_name: Some("   ".into()),
            ..Default::default()
        };
        let err = validate_field_update(&fields).unwrap_err();
        assert_eq!(err.message(), "Full name cannot be empty.");
    }

    #[test]
    fn field_update_normalizes_values() {
        let fields = UserFieldUpdate {
            full_name: Some("  Priya Sharma  ".into()),
            mob_num: Some("+919876543210".into()),
            pan_num: Some("abcde1234f".into()),
            manager_id: Some("mgr-1".into()),
        };
        let plan = validate_field_update(&fields).unwrap();
        assert_eq!(plan.columns.full_name.as_deref(), Some("Priya Sharma"));
        assert_eq!(plan.columns.mob_num.as_deref(), Some("9876543210"));
        assert_eq!(plan.columns.pan_num.as_deref(), Some("ABCDE1234F"));
        assert_eq!(plan.manager_id.as_deref(), Some("mgr-1"));
    }

    #[test]
    fn absent_fields_touch_nothing() {
        let plan = validate_field_update(&UserFieldUpdate::default()).unwrap();
        assert!(plan.columns.is_empty());
        assert!(plan.manager_id.is_none());
    }
}
