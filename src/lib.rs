//! # cloud-budgets
//!
//! Typed client for AWS Budgets and cross-account STS credentials.
//!
//! This library provides:
//! - Validated budget requests and their wire payloads
//! - A budget service for list/get/create/update/delete
//! - A credential broker that assumes the organization access role
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────┐        ┌──────────────────┐
//!   │  BudgetService  │        │ CredentialBroker │
//!   └────────┬────────┘        └────────┬─────────┘
//!            │ BudgetsApi               │ StsApi
//!            ▼                          ▼
//!   ┌─────────────────┐        ┌──────────────────┐
//!   │BudgetsHttpClient│        │  StsHttpClient   │
//!   └────────┬────────┘        └────────┬─────────┘
//!            └──────────┬───────────────┘
//!                       ▼
//!              SigV4-signed HTTPS
//! ```
//!
//! ## Modules
//! - `budget`: request shapes, serialization and `BudgetService`
//! - `credentials`: `CredentialBroker` and temporary credentials
//! - `api`: remote API traits, HTTP clients and in-memory fakes
//! - `config`: environment-driven client configuration

pub mod api;
pub mod budget;
pub mod config;
pub mod credentials;
pub mod error;
pub mod util;

pub use budget::{BudgetRequest, BudgetService};
pub use config::Config;
pub use credentials::{CredentialBroker, TemporaryCredentials};
pub use error::{Error, RemoteApiError, RemoteErrorKind};
