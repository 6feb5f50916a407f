//! Development Data Seeder
//!
//! Seeds an initial admin account (and a demo user with a sample deal) so
//! a fresh development database is usable immediately. Never runs in
//! production setups; the server only invokes it behind `DF_DEV_MODE`.

use std::sync::Arc;

use tracing::info;

use crate::domain::{DealType, Role};
use crate::error::Result;
use crate::service::policy::AuthContext;
use crate::service::{DealDraft, DealService, NewUser, UserService};

pub struct DevDataSeeder {
    user_service: Arc<UserService>,
    deal_service: Arc<DealService>,
}

impl DevDataSeeder {
    pub fn new(user_service: Arc<UserService>, deal_service: Arc<DealService>) -> Self {
        Self {
            user_service,
            deal_service,
        }
    }

    /// Seed dev data. Errors on duplicates, which the caller treats as
    /// "already seeded".
    pub async fn seed(&self) -> Result<()> {
        let admin = self
            .user_service
            .create_user(NewUser {
                username: "admin".to_string(),
                email: "admin@dealflow.local".to_string(),
                password: "admin".to_string(),
                role: Some(Role::Admin),
            })
            .await?;
        info!(user_id = %admin.id, "seeded admin account");

        let analyst = self
            .user_service
            .create_user(NewUser {
                username: "analyst".to_string(),
                email: "analyst@dealflow.local".to_string(),
                password: "analyst".to_string(),
                role: Some(Role::User),
            })
            .await?;
        info!(user_id = %analyst.id, "seeded analyst account");

        let admin_ctx = AuthContext {
            user_id: admin.id,
            username: admin.username,
            role: admin.role,
        };
        let deal = self
            .deal_service
            .create_deal(
                DealDraft {
                    title: "Acme Corp acquisition".to_string(),
                    sector: "Technology".to_string(),
                    deal_type: DealType::Acquisition,
                    deal_value: Some(12_500_000.0),
                },
                &admin_ctx,
            )
            .await?;
        info!(deal_id = %deal.id, "seeded sample deal");

        Ok(())
    }
}
