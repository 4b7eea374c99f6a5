//! Remote API seams for the budgets and STS services.
//!
//! Services depend only on the [`BudgetsApi`] and [`StsApi`] traits, one
//! method per remote operation. Implementations:
//! - `budgets` / `sts`: SigV4-signed calls to the real endpoints ([`BudgetsHttpClient`], [`StsHttpClient`])
//! - `memory`: in-memory fakes that record every call (for testing)

mod budgets;
mod memory;
mod signer;
mod sts;
mod transport;

pub use budgets::BudgetsHttpClient;
pub use memory::{InMemoryBudgets, InMemorySts};
pub use signer::{SignatureV4, SigningCredentials};
pub use sts::StsHttpClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::budget::{BudgetRecord, NotificationRule, WirePayload};
use crate::credentials::TemporaryCredentials;
use crate::error::Error;

/// The budgets service operations this crate uses.
#[async_trait]
pub trait BudgetsApi: Send + Sync {
    /// List the budgets of an account (first page only).
    async fn describe_budgets(&self, account_id: &str) -> Result<Vec<BudgetRecord>, Error>;

    async fn describe_budget(&self, account_id: &str, name: &str) -> Result<BudgetRecord, Error>;

    async fn describe_notifications_for_budget(
        &self,
        account_id: &str,
        name: &str,
    ) -> Result<Vec<NotificationRule>, Error>;

    /// Create a budget. `notifications` are serialized notification bundles.
    async fn create_budget(
        &self,
        account_id: &str,
        budget: WirePayload,
        notifications: Vec<Value>,
    ) -> Result<(), Error>;

    /// Replace a budget definition wholesale.
    async fn update_budget(&self, account_id: &str, new_budget: WirePayload) -> Result<(), Error>;

    async fn delete_budget(&self, account_id: &str, name: &str) -> Result<(), Error>;
}

/// The STS operation this crate uses.
#[async_trait]
pub trait StsApi: Send + Sync {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<TemporaryCredentials, Error>;
}
