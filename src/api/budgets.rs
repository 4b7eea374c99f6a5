//! AWS Budgets client over the JSON 1.1 protocol.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::signer::SigningCredentials;
use super::transport::{AwsTransport, RawResponse};
use super::BudgetsApi;
use crate::budget::{BudgetRecord, NotificationRule, WirePayload};
use crate::config::Config;
use crate::error::{Error, RemoteApiError};

const SERVICE: &str = "budgets";
const TARGET_PREFIX: &str = "AWSBudgetServiceGateway";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Budgets client signing requests with SigV4.
pub struct BudgetsHttpClient {
    transport: AwsTransport,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeBudgetsResponse {
    #[serde(default)]
    budgets: Vec<BudgetRecord>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeBudgetResponse {
    budget: BudgetRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeNotificationsResponse {
    #[serde(default)]
    notifications: Vec<NotificationRule>,
}

impl BudgetsHttpClient {
    /// Create a client for the partition's global budgets endpoint, or the
    /// configured override.
    pub fn new(config: &Config) -> Result<Self, Error> {
        Self::with_endpoint(
            config.signing_credentials(),
            &config.budgets_endpoint(),
            config.budgets_signing_region(),
        )
    }

    pub fn with_endpoint(
        credentials: SigningCredentials,
        endpoint: &str,
        signing_region: impl Into<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            transport: AwsTransport::new(credentials, endpoint, signing_region, SERVICE)?,
        })
    }

    async fn call<T: DeserializeOwned>(&self, operation: &str, input: Value) -> Result<T, Error> {
        let body = serde_json::to_vec(&input)
            .map_err(|e| Error::Transport(format!("Failed to encode {}: {}", operation, e)))?;
        let headers = [
            ("content-type", CONTENT_TYPE.to_string()),
            ("x-amz-target", format!("{}.{}", TARGET_PREFIX, operation)),
        ];

        tracing::debug!(operation, endpoint = %self.transport.endpoint(), "Calling budgets API");
        let response = self.transport.post(&headers, body).await?;
        if !response.is_success() {
            return Err(json_error(&response).into());
        }

        let body = if response.body.trim().is_empty() {
            "{}"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| {
            Error::Transport(format!(
                "Failed to parse {} response: {}, body: {}",
                operation, e, response.body
            ))
        })
    }
}

/// Decode a JSON-protocol error body.
///
/// The code comes from `__type` (possibly namespaced) or, failing that,
/// the `x-amzn-ErrorType` header (possibly carrying a `:<uri>` suffix).
/// Both decorations are stripped from the stored code.
pub(crate) fn json_error(response: &RawResponse) -> RemoteApiError {
    let parsed: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
    let code = parsed
        .get("__type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| response.error_type.clone())
        .unwrap_or_else(|| format!("HTTP{}", response.status));
    let message = parsed
        .get("Message")
        .or_else(|| parsed.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| response.body.clone());

    let code = code.rsplit('#').next().unwrap_or(&code);
    let code = code.split(':').next().unwrap_or(code).to_string();
    RemoteApiError::new(code, message).with_status(response.status)
}

#[async_trait]
impl BudgetsApi for BudgetsHttpClient {
    async fn describe_budgets(&self, account_id: &str) -> Result<Vec<BudgetRecord>, Error> {
        let response: DescribeBudgetsResponse = self
            .call("DescribeBudgets", json!({ "AccountId": account_id }))
            .await?;
        if response.next_token.is_some() {
            tracing::debug!(account_id, "More budgets available; only the first page is returned");
        }
        Ok(response.budgets)
    }

    async fn describe_budget(&self, account_id: &str, name: &str) -> Result<BudgetRecord, Error> {
        let response: DescribeBudgetResponse = self
            .call(
                "DescribeBudget",
                json!({ "AccountId": account_id, "BudgetName": name }),
            )
            .await?;
        Ok(response.budget)
    }

    async fn describe_notifications_for_budget(
        &self,
        account_id: &str,
        name: &str,
    ) -> Result<Vec<NotificationRule>, Error> {
        let response: DescribeNotificationsResponse = self
            .call(
                "DescribeNotificationsForBudget",
                json!({ "AccountId": account_id, "BudgetName": name }),
            )
            .await?;
        Ok(response.notifications)
    }

    async fn create_budget(
        &self,
        account_id: &str,
        budget: WirePayload,
        notifications: Vec<Value>,
    ) -> Result<(), Error> {
        let _: Value = self
            .call(
                "CreateBudget",
                json!({
                    "AccountId": account_id,
                    "Budget": budget,
                    "NotificationsWithSubscribers": notifications,
                }),
            )
            .await?;
        Ok(())
    }

    async fn update_budget(&self, account_id: &str, new_budget: WirePayload) -> Result<(), Error> {
        let _: Value = self
            .call(
                "UpdateBudget",
                json!({ "AccountId": account_id, "NewBudget": new_budget }),
            )
            .await?;
        Ok(())
    }

    async fn delete_budget(&self, account_id: &str, name: &str) -> Result<(), Error> {
        let _: Value = self
            .call(
                "DeleteBudget",
                json!({ "AccountId": account_id, "BudgetName": name }),
            )
            .await?;
        Ok(())
    }
}
