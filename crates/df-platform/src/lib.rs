//! DealFlow Platform
//!
//! Core platform providing:
//! - Credential and session lifecycle (login, refresh-token rotation, logout)
//! - Stateless signed access tokens
//! - Role- and ownership-scoped visibility of deal data
//! - Deal pipeline management with collaborative notes
//! - User administration and audit logging

pub mod domain;
pub mod repository;
pub mod service;
pub mod api;
pub mod error;
pub mod seed;
pub mod tsid;

pub use domain::*;
pub use error::PlatformError;
pub use tsid::TsidGenerator;
