//! Session Lifecycle Tests
//!
//! Exercises login, refresh-token rotation, and logout against in-memory
//! stores, including the concurrency property: two refreshes of the same
//! token value can never both succeed.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};

use df_platform::domain::{RefreshTokenRecord, Role};
use df_platform::error::PlatformError;
use df_platform::repository::{RefreshTokenStore, UserStore};
use df_platform::service::{
    AuditService, AuthService, PasswordService, RefreshTokenLedger, SessionService,
};

use common::{
    seed_user, test_auth_service, InMemoryAuditLogStore, InMemoryRefreshTokenStore,
    InMemoryUserStore,
};

struct Harness {
    users: Arc<InMemoryUserStore>,
    token_store: Arc<InMemoryRefreshTokenStore>,
    tokens: Arc<AuthService>,
    passwords: Arc<PasswordService>,
    sessions: SessionService,
}

fn harness() -> Harness {
    let users = Arc::new(InMemoryUserStore::default());
    let token_store = Arc::new(InMemoryRefreshTokenStore::default());
    let tokens = test_auth_service();
    let passwords = Arc::new(PasswordService::default());
    let ledger = Arc::new(RefreshTokenLedger::new(token_store.clone()));

    let sessions = SessionService::new(
        users.clone(),
        passwords.clone(),
        tokens.clone(),
        ledger,
    );

    Harness {
        users,
        token_store,
        tokens,
        passwords,
        sessions,
    }
}

mod login_tests {
    use super::*;

    #[tokio::test]
    async fn login_issues_valid_claims_and_persists_refresh_record() {
        let h = harness();
        seed_user(&h.users, &h.passwords, "alice", "correct-horse", Role::User).await;

        let pair = h.sessions.login("alice", "correct-horse").await.unwrap();

        let claims = h.tokens.validate_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::User);

        let hash = RefreshTokenRecord::hash_token(&pair.refresh_token);
        let record = h.token_store.find_by_hash(&hash).await.unwrap().unwrap();
        assert!(!record.revoked);
        assert!(record.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn login_carries_admin_role_in_claims() {
        let h = harness();
        seed_user(&h.users, &h.passwords, "boss", "pw", Role::Admin).await;

        let pair = h.sessions.login("boss", "pw").await.unwrap();
        let claims = h.tokens.validate_token(&pair.access_token).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_identically() {
        let h = harness();
        seed_user(&h.users, &h.passwords, "alice", "correct-horse", Role::User).await;

        let wrong_password = h.sessions.login("alice", "battery-staple").await;
        let unknown_user = h.sessions.login("nobody", "battery-staple").await;

        assert!(matches!(wrong_password, Err(PlatformError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(PlatformError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn inactive_account_cannot_log_in() {
        let h = harness();
        let mut user = seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;
        user.set_active(false);
        h.users.update(&user).await.unwrap();

        assert!(matches!(
            h.sessions.login("alice", "pw").await,
            Err(PlatformError::InvalidCredentials)
        ));
    }
}

mod rotation_tests {
    use super::*;

    #[tokio::test]
    async fn refresh_rotates_to_a_new_token_value() {
        let h = harness();
        seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;

        let first = h.sessions.login("alice", "pw").await.unwrap();
        let second = h.sessions.refresh(&first.refresh_token).await.unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);

        // The old value is permanently unusable.
        assert!(matches!(
            h.sessions.refresh(&first.refresh_token).await,
            Err(PlatformError::RefreshTokenRevoked)
        ));

        // The successor still works.
        h.sessions.refresh(&second.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn sequential_double_refresh_fails_the_second_time() {
        let h = harness();
        seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;
        let pair = h.sessions.login("alice", "pw").await.unwrap();

        assert!(h.sessions.refresh(&pair.refresh_token).await.is_ok());
        assert!(matches!(
            h.sessions.refresh(&pair.refresh_token).await,
            Err(PlatformError::RefreshTokenRevoked)
        ));
    }

    #[tokio::test]
    async fn concurrent_double_refresh_has_exactly_one_winner() {
        let h = harness();
        seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;
        let pair = h.sessions.login("alice", "pw").await.unwrap();

        let (a, b) = tokio::join!(
            h.sessions.refresh(&pair.refresh_token),
            h.sessions.refresh(&pair.refresh_token),
        );

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1, "exactly one concurrent refresh may succeed");

        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser, Err(PlatformError::RefreshTokenRevoked)));
    }

    #[tokio::test]
    async fn refresh_of_unknown_token_is_not_found() {
        let h = harness();
        seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;

        assert!(matches!(
            h.sessions.refresh("completely-made-up").await,
            Err(PlatformError::RefreshTokenNotFound)
        ));
    }

    #[tokio::test]
    async fn expired_token_fails_with_expired_even_if_never_revoked() {
        let h = harness();
        let user = seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;

        // Insert a record whose validity window is already over.
        let (raw, record) =
            RefreshTokenRecord::generate_token_pair(&user.id, Duration::seconds(-10));
        h.token_store.insert(&record).await.unwrap();

        assert!(matches!(
            h.sessions.refresh(&raw).await,
            Err(PlatformError::RefreshTokenExpired)
        ));
    }

    #[tokio::test]
    async fn refresh_fails_fatally_when_identity_vanished() {
        let h = harness();
        let user = seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;
        let pair = h.sessions.login("alice", "pw").await.unwrap();

        h.users.delete(&user.id).await.unwrap();

        assert!(matches!(
            h.sessions.refresh(&pair.refresh_token).await,
            Err(PlatformError::UserNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn refresh_is_rejected_for_deactivated_account() {
        let h = harness();
        let mut user = seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;
        let pair = h.sessions.login("alice", "pw").await.unwrap();

        user.set_active(false);
        h.users.update(&user).await.unwrap();

        assert!(matches!(
            h.sessions.refresh(&pair.refresh_token).await,
            Err(PlatformError::InvalidCredentials)
        ));
    }
}

mod logout_tests {
    use super::*;

    #[tokio::test]
    async fn logout_then_refresh_fails_with_revoked() {
        let h = harness();
        seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;
        let pair = h.sessions.login("alice", "pw").await.unwrap();

        h.sessions.logout(&pair.refresh_token).await.unwrap();

        assert!(matches!(
            h.sessions.refresh(&pair.refresh_token).await,
            Err(PlatformError::RefreshTokenRevoked)
        ));
    }

    #[tokio::test]
    async fn double_logout_is_an_observable_error() {
        let h = harness();
        seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;
        let pair = h.sessions.login("alice", "pw").await.unwrap();

        h.sessions.logout(&pair.refresh_token).await.unwrap();
        assert!(matches!(
            h.sessions.logout(&pair.refresh_token).await,
            Err(PlatformError::RefreshTokenRevoked)
        ));
    }

    #[tokio::test]
    async fn logout_with_unknown_token_fails() {
        let h = harness();
        assert!(matches!(
            h.sessions.logout("never-issued").await,
            Err(PlatformError::RefreshTokenNotFound)
        ));
    }

    #[tokio::test]
    async fn access_token_survives_logout_until_ttl() {
        // Documented limitation of stateless access tokens: revoking the
        // refresh token does not invalidate an already-issued access token.
        let h = harness();
        seed_user(&h.users, &h.passwords, "alice", "pw", Role::User).await;
        let pair = h.sessions.login("alice", "pw").await.unwrap();

        h.sessions.logout(&pair.refresh_token).await.unwrap();
        assert!(h.tokens.validate_token(&pair.access_token).is_ok());
    }
}

mod audit_tests {
    use super::*;
    use df_platform::domain::AuditAction;

    #[tokio::test]
    async fn session_lifecycle_is_audited() {
        let users = Arc::new(InMemoryUserStore::default());
        let token_store = Arc::new(InMemoryRefreshTokenStore::default());
        let passwords = Arc::new(PasswordService::default());
        let audit_store = Arc::new(InMemoryAuditLogStore::default());
        let ledger = Arc::new(RefreshTokenLedger::new(token_store));

        let sessions = SessionService::new(
            users.clone(),
            passwords.clone(),
            test_auth_service(),
            ledger,
        )
        .with_audit(Arc::new(AuditService::new(audit_store.clone())));

        seed_user(&users, &passwords, "alice", "pw", Role::User).await;

        let _ = sessions.login("alice", "wrong").await;
        let pair = sessions.login("alice", "pw").await.unwrap();
        let rotated = sessions.refresh(&pair.refresh_token).await.unwrap();
        sessions.logout(&rotated.refresh_token).await.unwrap();

        let actions: Vec<AuditAction> =
            audit_store.entries().iter().map(|l| l.action).collect();
        assert_eq!(
            actions,
            vec![
                AuditAction::Login,       // failed attempt
                AuditAction::Login,       // success
                AuditAction::TokenRotated,
                AuditAction::Logout,
            ]
        );

        let failed = &audit_store.entries()[0];
        assert!(failed.description.contains("Failed login"));
    }
}

mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn alice_full_session_lifecycle() {
        let h = harness();
        seed_user(&h.users, &h.passwords, "alice", "wonderland", Role::User).await;

        // Login with the correct password yields a pair.
        let pair = h.sessions.login("alice", "wonderland").await.unwrap();
        let claims = h.tokens.validate_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::User);

        // Refresh succeeds once...
        let rotated = h.sessions.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        // ...and immediately retrying with the original value fails.
        assert!(matches!(
            h.sessions.refresh(&pair.refresh_token).await,
            Err(PlatformError::RefreshTokenRevoked)
        ));
    }
}
