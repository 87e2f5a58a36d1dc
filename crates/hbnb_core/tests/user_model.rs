use hbnb_core::{InMemoryUserRepository, User, UserPatch, UserService};

#[test]
fn serialized_user_uses_expected_wire_fields() {
    let user = User::new("John", "Doe", "john.doe@example.com", "password123");

    let json = serde_json::to_value(&user).unwrap();
    let object = json.as_object().unwrap();
    let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "created_at",
            "email",
            "first_name",
            "id",
            "is_admin",
            "last_name",
            "updated_at"
        ]
    );
    assert_eq!(json["id"], user.id.to_string());
    assert_eq!(json["is_admin"], false);
    assert_eq!(json["created_at"], json["updated_at"]);
}

#[test]
fn timestamps_serialize_as_iso8601_strings() {
    let user = User::new("John", "Doe", "john.doe@example.com", "password123");
    let json = serde_json::to_value(&user).unwrap();

    let created = json["created_at"].as_str().unwrap();
    let parsed = chrono::DateTime::parse_from_rfc3339(created).unwrap();
    assert_eq!(parsed, user.created_at());
}

#[test]
fn listed_users_never_expose_password() {
    let service = UserService::new(InMemoryUserRepository::new());
    for i in 0..3 {
        service
            .create_user("User", "Test", &format!("user{i}@example.com"), "s3cretpass")
            .unwrap();
    }

    let rendered = serde_json::to_string(&service.list_users()).unwrap();
    assert!(!rendered.contains("password"));
    assert!(!rendered.contains("s3cretpass"));
}

#[test]
fn patch_deserializes_from_partial_json() {
    let patch: UserPatch = serde_json::from_value(serde_json::json!({
        "first_name": "Robert"
    }))
    .unwrap();
    assert_eq!(patch.first_name.as_deref(), Some("Robert"));
    assert!(patch.last_name.is_none());
    assert!(!patch.is_empty());
}

#[test]
fn patch_rejects_protected_fields_in_json() {
    let err = serde_json::from_value::<UserPatch>(serde_json::json!({
        "password": "newpassword"
    }))
    .unwrap_err();
    assert!(err.to_string().contains("password"), "unexpected error: {err}");
}
