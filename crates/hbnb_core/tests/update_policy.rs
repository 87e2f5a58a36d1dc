use hbnb_core::{
    in_memory_service, CoreConfig, InMemoryUserRepository, InvalidUpdatePolicy, User, UserPatch,
    UserService, UserServiceError, UserValidationError,
};

fn invalid_email_patch() -> UserPatch {
    UserPatch {
        first_name: Some("Caroline".to_string()),
        email: Some("invalid".to_string()),
        ..UserPatch::default()
    }
}

fn seed(service: &UserService<InMemoryUserRepository>) -> User {
    service
        .create_user("Carol", "Brown", "carol@example.com", "password123")
        .unwrap()
}

#[test]
fn default_policy_keeps_the_failed_patch() {
    let service = in_memory_service(&CoreConfig::default());
    assert_eq!(
        service.invalid_update_policy(),
        InvalidUpdatePolicy::KeepMutation
    );
    let created = seed(&service);

    let err = service
        .update_user(&created.id.to_string(), &invalid_email_patch())
        .unwrap_err();
    assert_eq!(
        err,
        UserServiceError::Validation(vec![UserValidationError::InvalidEmail])
    );

    // The store already holds the patched (invalid) record.
    let stored = service.get_user(&created.id.to_string()).unwrap();
    assert_eq!(stored.email, "invalid");
    assert_eq!(stored.first_name, "Caroline");
    assert!(stored.updated_at() > created.updated_at());
}

#[test]
fn rollback_policy_restores_the_previous_record() {
    let config = CoreConfig {
        on_invalid_update: InvalidUpdatePolicy::Rollback,
        ..CoreConfig::default()
    };
    let service = in_memory_service(&config);
    let created = seed(&service);

    let err = service
        .update_user(&created.id.to_string(), &invalid_email_patch())
        .unwrap_err();
    assert_eq!(err.messages(), vec!["Invalid email format".to_string()]);

    let stored = service.get_user(&created.id.to_string()).unwrap();
    assert_eq!(stored, created);
}

#[test]
fn blank_name_update_is_reported_under_both_policies() {
    for policy in [InvalidUpdatePolicy::KeepMutation, InvalidUpdatePolicy::Rollback] {
        let service = UserService::with_policy(InMemoryUserRepository::new(), policy);
        let created = seed(&service);
        let patch = UserPatch {
            last_name: Some("   ".to_string()),
            ..UserPatch::default()
        };

        let err = service
            .update_user(&created.id.to_string(), &patch)
            .unwrap_err();
        assert_eq!(
            err,
            UserServiceError::Validation(vec![UserValidationError::LastNameRequired])
        );

        let stored = service.get_user(&created.id.to_string()).unwrap();
        match policy {
            InvalidUpdatePolicy::KeepMutation => assert_eq!(stored.last_name, "   "),
            InvalidUpdatePolicy::Rollback => assert_eq!(stored.last_name, "Brown"),
        }
    }
}
