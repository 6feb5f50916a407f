//! API Layer
//!
//! REST API endpoints for the platform.

pub mod common;
pub mod middleware;

pub mod auth;
pub mod users;
pub mod deals;
pub mod audit_logs;
pub mod openapi;

pub use common::*;
pub use middleware::{AppState, Authenticated};

pub use auth::{auth_router, AuthApiState};
pub use users::{users_router, UsersState};
pub use deals::{deals_router, DealsState};
pub use audit_logs::{audit_logs_router, AuditLogsState};
pub use openapi::PlatformApiDoc;
