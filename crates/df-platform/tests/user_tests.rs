//! User Administration Tests

mod common;

use std::sync::Arc;

use df_platform::domain::Role;
use df_platform::error::PlatformError;
use df_platform::service::{NewUser, PasswordService, UserService};

use common::InMemoryUserStore;

fn service() -> (UserService, Arc<PasswordService>) {
    let passwords = Arc::new(PasswordService::default());
    (
        UserService::new(Arc::new(InMemoryUserStore::default()), passwords.clone()),
        passwords,
    )
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: "initial-pw".to_string(),
        role: None,
    }
}

#[tokio::test]
async fn created_user_defaults_to_active_regular_user() {
    let (svc, passwords) = service();
    let user = svc.create_user(new_user("alice", "alice@example.com")).await.unwrap();

    assert_eq!(user.role, Role::User);
    assert!(user.active);
    // Password is stored hashed, never verbatim.
    assert_ne!(user.password_hash, "initial-pw");
    assert!(passwords.verify_password("initial-pw", &user.password_hash).unwrap());
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let (svc, _) = service();
    svc.create_user(new_user("alice", "alice@example.com")).await.unwrap();

    let err = svc
        .create_user(new_user("alice", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::Duplicate { ref field, .. } if field == "username"));
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let (svc, _) = service();
    svc.create_user(new_user("alice", "alice@example.com")).await.unwrap();

    let err = svc
        .create_user(new_user("alice2", "alice@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::Duplicate { ref field, .. } if field == "email"));
}

#[tokio::test]
async fn promote_changes_role() {
    let (svc, _) = service();
    svc.create_user(new_user("alice", "alice@example.com")).await.unwrap();

    let promoted = svc.promote_to_admin("alice").await.unwrap();
    assert_eq!(promoted.role, Role::Admin);
}

#[tokio::test]
async fn promote_unknown_user_is_not_found() {
    let (svc, _) = service();
    assert!(matches!(
        svc.promote_to_admin("ghost").await,
        Err(PlatformError::NotFound { .. })
    ));
}

#[tokio::test]
async fn reset_password_replaces_hash() {
    let (svc, passwords) = service();
    svc.create_user(new_user("alice", "alice@example.com")).await.unwrap();

    let updated = svc.reset_password("alice", "new-pw").await.unwrap();
    assert!(passwords.verify_password("new-pw", &updated.password_hash).unwrap());
    assert!(!passwords.verify_password("initial-pw", &updated.password_hash).unwrap());
}

#[tokio::test]
async fn status_toggle_round_trips() {
    let (svc, _) = service();
    svc.create_user(new_user("alice", "alice@example.com")).await.unwrap();

    let off = svc.set_active("alice", false).await.unwrap();
    assert!(!off.active);
    let on = svc.set_active("alice", true).await.unwrap();
    assert!(on.active);
}

#[tokio::test]
async fn delete_then_lookup_is_not_found() {
    let (svc, _) = service();
    svc.create_user(new_user("alice", "alice@example.com")).await.unwrap();

    svc.delete_user("alice").await.unwrap();
    assert!(matches!(
        svc.find_by_username("alice").await,
        Err(PlatformError::NotFound { .. })
    ));
}
