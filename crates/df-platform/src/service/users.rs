//! User Service
//!
//! Administrative provisioning and maintenance of user accounts.

use std::sync::Arc;

use tracing::info;

use crate::domain::{Role, User};
use crate::error::{PlatformError, Result};
use crate::repository::UserStore;
use crate::service::password::PasswordService;

/// Input for user creation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    passwords: Arc<PasswordService>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, passwords: Arc<PasswordService>) -> Self {
        Self { users, passwords }
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        if new_user.username.trim().is_empty() {
            return Err(PlatformError::validation("Username must not be empty"));
        }
        if new_user.email.trim().is_empty() {
            return Err(PlatformError::validation("Email must not be empty"));
        }
        if new_user.password.is_empty() {
            return Err(PlatformError::validation("Password must not be empty"));
        }

        if self.users.exists_by_username(&new_user.username).await? {
            return Err(PlatformError::duplicate("User", "username", &new_user.username));
        }
        if self.users.exists_by_email(&new_user.email).await? {
            return Err(PlatformError::duplicate("User", "email", &new_user.email));
        }

        let password_hash = self.passwords.hash_password(&new_user.password)?;
        let user = User::new(
            new_user.username,
            new_user.email,
            password_hash,
            new_user.role.unwrap_or_default(),
        );

        self.users.insert(&user).await?;
        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| PlatformError::not_found("User", username))
    }

    pub async fn find_all(&self) -> Result<Vec<User>> {
        self.users.find_all().await
    }

    pub async fn promote_to_admin(&self, username: &str) -> Result<User> {
        let mut user = self.find_by_username(username).await?;
        user.promote_to_admin();
        self.users.update(&user).await?;
        info!(user_id = %user.id, "user promoted to admin");
        Ok(user)
    }

    pub async fn set_active(&self, username: &str, active: bool) -> Result<User> {
        let mut user = self.find_by_username(username).await?;
        user.set_active(active);
        self.users.update(&user).await?;
        info!(user_id = %user.id, active, "user status changed");
        Ok(user)
    }

    pub async fn reset_password(&self, username: &str, new_password: &str) -> Result<User> {
        if new_password.is_empty() {
            return Err(PlatformError::validation("Password must not be empty"));
        }
        let mut user = self.find_by_username(username).await?;
        let password_hash = self.passwords.hash_password(new_password)?;
        user.set_password_hash(password_hash);
        self.users.update(&user).await?;
        info!(user_id = %user.id, "password reset");
        Ok(user)
    }

    pub async fn delete_user(&self, username: &str) -> Result<()> {
        let user = self.find_by_username(username).await?;
        self.users.delete(&user.id).await?;
        info!(user_id = %user.id, "user deleted");
        Ok(())
    }
}
