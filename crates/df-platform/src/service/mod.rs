//! Service Layer
//!
//! Business logic: token issuance, the refresh-token ledger, session
//! orchestration, access policy, and user/deal operations.

pub mod auth;
pub mod password;
pub mod refresh_token;
pub mod session;
pub mod policy;
pub mod users;
pub mod deals;
pub mod audit;

pub use auth::{extract_bearer_token, AccessTokenClaims, AuthConfig, AuthService};
pub use password::PasswordService;
pub use refresh_token::RefreshTokenLedger;
pub use session::{SessionService, SessionTokens};
pub use policy::{checks, AuthContext, DealNoteView, DealView};
pub use users::{NewUser, UserService};
pub use deals::{DealDraft, DealPatch, DealService};
pub use audit::AuditService;
