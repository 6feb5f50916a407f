//! Shared test fixtures: in-memory store implementations and helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use df_platform::domain::{AuditLog, Deal, DealStage, RefreshTokenRecord, Role, User};
use df_platform::error::Result;
use df_platform::repository::{AuditLogStore, DealStore, RefreshTokenStore, UserStore};
use df_platform::service::{AuthConfig, AuthContext, AuthService, PasswordService};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<()> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    records: Mutex<Vec<RefreshTokenRecord>>,
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.token_hash == token_hash)
            .cloned())
    }

    async fn revoke_if_active(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>> {
        // Compare-and-set under one lock: mirrors the conditional update
        // the Mongo repository issues, so two concurrent revocations of
        // the same hash can never both observe an active record.
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|r| r.token_hash == token_hash && !r.revoked)
        {
            Some(record) => {
                record.revoked = true;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct InMemoryDealStore {
    deals: Mutex<Vec<Deal>>,
}

#[async_trait]
impl DealStore for InMemoryDealStore {
    async fn insert(&self, deal: &Deal) -> Result<()> {
        self.deals.lock().unwrap().push(deal.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Deal>> {
        Ok(self.deals.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_owner(
        &self,
        owner_id: &str,
        offset: u64,
        limit: i64,
    ) -> Result<(Vec<Deal>, u64)> {
        let deals = self.deals.lock().unwrap();
        let matching: Vec<Deal> = deals
            .iter()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_filtered(
        &self,
        stage: Option<DealStage>,
        sector: Option<&str>,
        offset: u64,
        limit: i64,
    ) -> Result<(Vec<Deal>, u64)> {
        let deals = self.deals.lock().unwrap();
        let matching: Vec<Deal> = deals
            .iter()
            .filter(|d| stage.map_or(true, |s| d.stage == s))
            .filter(|d| sector.map_or(true, |s| d.sector == s))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, deal: &Deal) -> Result<()> {
        let mut deals = self.deals.lock().unwrap();
        if let Some(existing) = deals.iter_mut().find(|d| d.id == deal.id) {
            *existing = deal.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut deals = self.deals.lock().unwrap();
        let before = deals.len();
        deals.retain(|d| d.id != id);
        Ok(deals.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryAuditLogStore {
    logs: Mutex<Vec<AuditLog>>,
}

impl InMemoryAuditLogStore {
    pub fn entries(&self) -> Vec<AuditLog> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditLogStore for InMemoryAuditLogStore {
    async fn insert(&self, log: &AuditLog) -> Result<()> {
        self.logs.lock().unwrap().push(log.clone());
        Ok(())
    }

    async fn find_recent(&self, limit: i64) -> Result<Vec<AuditLog>> {
        let logs = self.logs.lock().unwrap();
        Ok(logs.iter().rev().take(limit as usize).cloned().collect())
    }
}

pub fn test_auth_service() -> Arc<AuthService> {
    Arc::new(AuthService::new(AuthConfig {
        secret_key: "session-test-secret".to_string(),
        ..AuthConfig::default()
    }))
}

pub async fn seed_user(
    store: &InMemoryUserStore,
    passwords: &PasswordService,
    username: &str,
    password: &str,
    role: Role,
) -> User {
    let hash = passwords.hash_password(password).unwrap();
    let user = User::new(username, format!("{}@example.com", username), hash, role);
    store.insert(&user).await.unwrap();
    user
}

pub fn ctx_for(user: &User) -> AuthContext {
    AuthContext {
        user_id: user.id.clone(),
        username: user.username.clone(),
        role: user.role,
    }
}
