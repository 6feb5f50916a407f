//! Session Service
//!
//! Orchestrates login, refresh, and logout over the credential store, the
//! token issuer, and the refresh-token ledger. Every failure propagates
//! upward with its specific kind; nothing is retried or reinterpreted.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{PlatformError, Result};
use crate::repository::UserStore;
use crate::service::audit::AuditService;
use crate::service::auth::AuthService;
use crate::service::password::PasswordService;
use crate::service::refresh_token::RefreshTokenLedger;

/// Access/refresh token pair returned by login and refresh.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionService {
    users: Arc<dyn UserStore>,
    passwords: Arc<PasswordService>,
    tokens: Arc<AuthService>,
    ledger: Arc<RefreshTokenLedger>,
    audit: Option<Arc<AuditService>>,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        passwords: Arc<PasswordService>,
        tokens: Arc<AuthService>,
        ledger: Arc<RefreshTokenLedger>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
            ledger,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: Arc<AuditService>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Authenticate with username/password and open a session.
    ///
    /// Unknown username, wrong password, and inactive account all collapse
    /// into `InvalidCredentials` so the endpoint cannot be used to
    /// enumerate accounts.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionTokens> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(username = %username, "login failed: unknown username");
                return self.login_failed(username).await;
            }
        };

        if !self.passwords.verify_password(password, &user.password_hash)? {
            warn!(username = %username, "login failed: password mismatch");
            return self.login_failed(username).await;
        }

        if !user.active {
            warn!(username = %username, "login failed: inactive account");
            return self.login_failed(username).await;
        }

        let access_token = self.tokens.generate_access_token(&user)?;
        let (refresh_token, _) = self.ledger.create(&user).await?;

        if let Some(audit) = &self.audit {
            let _ = audit.log_login(username, true).await;
        }

        info!(user_id = %user.id, "session opened");
        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// Strict rotation: the presented token is revoked before its
    /// successor is created, so the old value is permanently unusable.
    /// Of two concurrent refreshes of the same value, exactly one
    /// succeeds; the other observes `RefreshTokenRevoked` from the
    /// ledger's conditional update.
    pub async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens> {
        let record = self.ledger.validate(refresh_token).await?;

        let user = self
            .users
            .find_by_id(&record.user_id)
            .await?
            .ok_or(PlatformError::UserNotFound {
                id: record.user_id.clone(),
            })?;

        if !user.active {
            warn!(user_id = %user.id, "refresh rejected: inactive account");
            return Err(PlatformError::InvalidCredentials);
        }

        self.ledger.revoke(refresh_token).await?;
        let (new_refresh_token, _) = self.ledger.create(&user).await?;
        let access_token = self.tokens.generate_access_token(&user)?;

        if let Some(audit) = &self.audit {
            let _ = audit.log_token_rotated(&user.id).await;
        }

        info!(user_id = %user.id, "session rotated");
        Ok(SessionTokens {
            access_token,
            refresh_token: new_refresh_token,
        })
    }

    /// Close a session by revoking its refresh token.
    ///
    /// Propagates the full refresh-token taxonomy: logging out with a
    /// stale token is an observable error, not a no-op.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let record = self.ledger.revoke(refresh_token).await?;

        if let Some(audit) = &self.audit {
            let _ = audit.log_logout(&record.user_id).await;
        }

        info!(user_id = %record.user_id, "session closed");
        Ok(())
    }

    async fn login_failed(&self, username: &str) -> Result<SessionTokens> {
        if let Some(audit) = &self.audit {
            let _ = audit.log_login(username, false).await;
        }
        Err(PlatformError::InvalidCredentials)
    }
}
