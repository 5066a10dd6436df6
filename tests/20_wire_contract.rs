// Wire-level contract for request and response bodies: field names, optional
// fields, and timestamp formatting must stay stable for existing clients.

use chrono::{TimeZone, Utc};
use serde_json::json;

use staff_registry::database::models::user::User;
use staff_registry::services::user_service::{
    CreateUserInput, DeleteUserInput, GetUsersInput, UpdateUsersInput,
};

#[test]
fn create_request_accepts_optional_manager() {
    let input: CreateUserInput = serde_json::from_value(json!({
        "full_name": "Priya Sharma",
        "mob_num": "+919876543210",
        "pan_num": "abcde1234f"
    }))
    .unwrap();
    assert_eq!(input.full_name.as_deref(), Some("Priya Sharma"));
    assert!(input.manager_id.is_none());

    let input: CreateUserInput = serde_json::from_value(json!({
        "full_name": "Priya Sharma",
        "mob_num": "9876543210",
        "pan_num": "ABCDE1234F",
        "manager_id": "mgr-1"
    }))
    .unwrap();
    assert_eq!(input.manager_id.as_deref(), Some("mgr-1"));
}

#[test]
fn get_request_accepts_any_single_filter() {
    let input: GetUsersInput = serde_json::from_value(json!({})).unwrap();
    assert!(input.user_id.is_none() && input.mob_num.is_none() && input.manager_id.is_none());

    let input: GetUsersInput =
        serde_json::from_value(json!({ "manager_id": "mgr-1" })).unwrap();
    assert_eq!(input.manager_id.as_deref(), Some("mgr-1"));
}

#[test]
fn delete_request_fields_are_optional() {
    let input: DeleteUserInput =
        serde_json::from_value(json!({ "mob_num": "9876543210" })).unwrap();
    assert!(input.user_id.is_none());
    assert_eq!(input.mob_num.as_deref(), Some("9876543210"));
}

#[test]
fn update_request_maps_user_ids_to_fields() {
    let input: UpdateUsersInput = serde_json::from_value(json!({
        "user_ids": ["u1", "u2"],
        "update_data": {
            "u1": { "full_name": "New Name" },
            "u2": { "manager_id": "mgr-2" }
        }
    }))
    .unwrap();

    let user_ids = input.user_ids.unwrap();
    let update_data = input.update_data.unwrap();
    assert_eq!(user_ids, vec!["u1".to_string(), "u2".to_string()]);
    assert_eq!(
        update_data["u1"].full_name.as_deref(),
        Some("New Name")
    );
    assert_eq!(update_data["u2"].manager_id.as_deref(), Some("mgr-2"));
    assert!(update_data["u2"].full_name.is_none());
}

#[test]
fn user_rows_serialize_with_rfc3339_timestamps() {
    let user = User {
        user_id: "11111111-1111-1111-1111-111111111111".to_string(),
        full_name: "Priya Sharma".to_string(),
        mob_num: "9876543210".to_string(),
        pan_num: "ABCDE1234F".to_string(),
        manager_id: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        updated_at: None,
        is_active: true,
    };

    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(value["user_id"], "11111111-1111-1111-1111-111111111111");
    assert_eq!(value["created_at"], "2024-01-02T03:04:05Z");
    assert_eq!(value["updated_at"], serde_json::Value::Null);
    assert_eq!(value["manager_id"], serde_json::Value::Null);
    assert_eq!(value["is_active"], true);
}
