//! In-memory budgets and STS backends (non-persistent).
//!
//! Both record every call they receive so callers can assert on exact call
//! counts and arguments. Errors mirror the provider's codes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{BudgetsApi, StsApi};
use crate::budget::{BudgetRecord, NotificationRule, WirePayload};
use crate::credentials::TemporaryCredentials;
use crate::error::{Error, RemoteApiError};

#[derive(Debug, Clone)]
struct StoredBudget {
    record: BudgetRecord,
    notifications: Vec<NotificationRule>,
}

/// Budgets backend holding budgets per account in memory.
#[derive(Clone, Default)]
pub struct InMemoryBudgets {
    // account id -> budget name -> budget; BTreeMap keeps list order stable
    accounts: Arc<RwLock<HashMap<String, BTreeMap<String, StoredBudget>>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl InMemoryBudgets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation names received so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn record_call(&self, operation: &str) {
        self.calls.write().await.push(operation.to_string());
    }

    fn not_found(name: &str) -> Error {
        RemoteApiError::new(
            "NotFoundException",
            format!("Unable to get budget: {} - the budget doesn't exist.", name),
        )
        .with_status(400)
        .into()
    }

    fn parse_budget(budget: WirePayload) -> Result<BudgetRecord, Error> {
        serde_json::from_value(Value::Object(budget)).map_err(|e| {
            RemoteApiError::new("InvalidParameterException", e.to_string())
                .with_status(400)
                .into()
        })
    }
}

#[async_trait]
impl BudgetsApi for InMemoryBudgets {
    async fn describe_budgets(&self, account_id: &str) -> Result<Vec<BudgetRecord>, Error> {
        self.record_call("DescribeBudgets").await;
        Ok(self
            .accounts
            .read()
            .await
            .get(account_id)
            .map(|budgets| budgets.values().map(|b| b.record.clone()).collect())
            .unwrap_or_default())
    }

    async fn describe_budget(&self, account_id: &str, name: &str) -> Result<BudgetRecord, Error> {
        self.record_call("DescribeBudget").await;
        self.accounts
            .read()
            .await
            .get(account_id)
            .and_then(|budgets| budgets.get(name))
            .map(|b| b.record.clone())
            .ok_or_else(|| Self::not_found(name))
    }

    async fn describe_notifications_for_budget(
        &self,
        account_id: &str,
        name: &str,
    ) -> Result<Vec<NotificationRule>, Error> {
        self.record_call("DescribeNotificationsForBudget").await;
        self.accounts
            .read()
            .await
            .get(account_id)
            .and_then(|budgets| budgets.get(name))
            .map(|b| b.notifications.clone())
            .ok_or_else(|| Self::not_found(name))
    }

    async fn create_budget(
        &self,
        account_id: &str,
        budget: WirePayload,
        notifications: Vec<Value>,
    ) -> Result<(), Error> {
        self.record_call("CreateBudget").await;
        let record = Self::parse_budget(budget)?;
        let notifications = notifications
            .into_iter()
            .map(|bundle| {
                serde_json::from_value(bundle["Notification"].clone()).map_err(|e| {
                    Error::from(RemoteApiError::new("InvalidParameterException", e.to_string()))
                })
            })
            .collect::<Result<Vec<NotificationRule>, Error>>()?;

        let mut accounts = self.accounts.write().await;
        let budgets = accounts.entry(account_id.to_string()).or_default();
        if budgets.contains_key(&record.budget_name) {
            return Err(RemoteApiError::new(
                "DuplicateRecordException",
                format!(
                    "Error creating budget: {} - the budget already exists.",
                    record.budget_name
                ),
            )
            .with_status(400)
            .into());
        }
        budgets.insert(
            record.budget_name.clone(),
            StoredBudget {
                record,
                notifications,
            },
        );
        Ok(())
    }

    async fn update_budget(&self, account_id: &str, new_budget: WirePayload) -> Result<(), Error> {
        self.record_call("UpdateBudget").await;
        let record = Self::parse_budget(new_budget)?;
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get_mut(account_id)
            .and_then(|budgets| budgets.get_mut(&record.budget_name))
            .ok_or_else(|| Self::not_found(&record.budget_name))?;
        stored.record = record;
        Ok(())
    }

    async fn delete_budget(&self, account_id: &str, name: &str) -> Result<(), Error> {
        self.record_call("DeleteBudget").await;
        self.accounts
            .write()
            .await
            .get_mut(account_id)
            .and_then(|budgets| budgets.remove(name))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(name))
    }
}

/// STS backend issuing fixed credentials valid for one hour.
#[derive(Clone, Default)]
pub struct InMemorySts {
    denied_accounts: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<(String, String)>>>,
}

impl InMemorySts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse assume-role calls into `account_id`.
    pub async fn deny(&self, account_id: &str) {
        self.denied_accounts
            .write()
            .await
            .insert(account_id.to_string());
    }

    /// `(role_arn, session_name)` pairs received so far, in order.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl StsApi for InMemorySts {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<TemporaryCredentials, Error> {
        self.calls
            .write()
            .await
            .push((role_arn.to_string(), session_name.to_string()));

        let account_id = role_arn.split(':').nth(4).unwrap_or_default();
        if self.denied_accounts.read().await.contains(account_id) {
            return Err(RemoteApiError::new(
                "AccessDenied",
                format!("User is not authorized to perform: sts:AssumeRole on resource: {}", role_arn),
            )
            .with_status(403)
            .into());
        }

        Ok(TemporaryCredentials {
            access_key_id: format!("ASIA{}", account_id),
            secret_access_key: "in-memory-secret".to_string(),
            session_token: format!("in-memory-session/{}", session_name),
            expiration: Utc::now() + Duration::hours(1),
        })
    }
}
