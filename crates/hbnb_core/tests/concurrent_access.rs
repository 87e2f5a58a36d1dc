use hbnb_core::{InMemoryUserRepository, UserPatch, UserService, UserServiceError};
use std::collections::HashSet;
use std::thread;

const WORKERS: usize = 8;

#[test]
fn concurrent_creates_with_same_email_insert_once() {
    let service = UserService::new(InMemoryUserRepository::new());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|i| {
                let service = &service;
                scope.spawn(move || {
                    service.create_user(
                        &format!("Racer{i}"),
                        "Doe",
                        "race@example.com",
                        "password123",
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .collect()
    });

    let created = results.iter().filter(|result| result.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|result| matches!(result, Err(UserServiceError::EmailAlreadyExists)))
        .count();
    assert_eq!(created, 1);
    assert_eq!(conflicts, WORKERS - 1);
    assert_eq!(service.list_users().len(), 1);
}

#[test]
fn concurrent_creates_with_distinct_emails_all_land() {
    let service = UserService::new(InMemoryUserRepository::new());

    thread::scope(|scope| {
        for i in 0..WORKERS {
            let service = &service;
            scope.spawn(move || {
                service
                    .create_user("User", "Test", &format!("user{i}@example.com"), "password123")
                    .expect("distinct email create");
            });
        }
    });

    let users = service.list_users();
    let ids: HashSet<_> = users.iter().map(|user| user.id).collect();
    assert_eq!(users.len(), WORKERS);
    assert_eq!(ids.len(), WORKERS);
}

#[test]
fn concurrent_email_swaps_keep_emails_unique() {
    let service = UserService::new(InMemoryUserRepository::new());
    let a = service
        .create_user("Ann", "One", "ann@example.com", "password123")
        .unwrap();
    let b = service
        .create_user("Ben", "Two", "ben@example.com", "password123")
        .unwrap();

    thread::scope(|scope| {
        for (id, target) in [(a.id, "shared@example.com"), (b.id, "shared@example.com")] {
            let service = &service;
            scope.spawn(move || {
                let patch = UserPatch {
                    email: Some(target.to_string()),
                    ..UserPatch::default()
                };
                let _ = service.update_user(&id.to_string(), &patch);
            });
        }
    });

    let emails: Vec<_> = service
        .list_users()
        .into_iter()
        .map(|user| user.email)
        .collect();
    let unique: HashSet<_> = emails.iter().collect();
    assert_eq!(unique.len(), emails.len());
    assert_eq!(
        emails.iter().filter(|email| *email == "shared@example.com").count(),
        1
    );
}
