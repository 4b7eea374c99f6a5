//! Budget operations composed over a [`BudgetsApi`].
//!
//! No retries, pagination or caching: every operation maps to a fixed
//! sequence of remote calls, awaited one after another.

use std::sync::Arc;

use super::notification::{NotificationBundle, NotificationRule};
use super::prune::PruneMode;
use super::record::{BudgetRecord, BudgetWithNotifications};
use super::request::BudgetRequest;
use crate::api::BudgetsApi;
use crate::error::Error;

pub struct BudgetService {
    api: Arc<dyn BudgetsApi>,
    prune_mode: PruneMode,
}

impl BudgetService {
    pub fn new(api: Arc<dyn BudgetsApi>) -> Self {
        Self {
            api,
            prune_mode: PruneMode::default(),
        }
    }

    /// Serialize requests with `mode` instead of the compatible prune.
    pub fn with_prune_mode(mut self, mode: PruneMode) -> Self {
        self.prune_mode = mode;
        self
    }

    /// List an account's budgets, each with its notification rules.
    ///
    /// Issues one list call plus one notifications call per budget, in the
    /// order the provider returned the budgets.
    pub async fn list_budgets(
        &self,
        account_id: &str,
    ) -> Result<Vec<BudgetWithNotifications>, Error> {
        let budgets = self.api.describe_budgets(account_id).await?;
        tracing::debug!(account_id, count = budgets.len(), "Listed budgets");

        let mut enriched = Vec::with_capacity(budgets.len());
        for budget in budgets {
            let notifications = self
                .api
                .describe_notifications_for_budget(account_id, &budget.budget_name)
                .await?;
            enriched.push(BudgetWithNotifications {
                budget,
                notifications,
            });
        }
        Ok(enriched)
    }

    /// Fetch one budget and its notification rules.
    pub async fn get_budget(
        &self,
        account_id: &str,
        name: &str,
    ) -> Result<(BudgetRecord, Vec<NotificationRule>), Error> {
        let budget = self.api.describe_budget(account_id, name).await?;
        let notifications = self
            .api
            .describe_notifications_for_budget(account_id, name)
            .await?;
        Ok((budget, notifications))
    }

    /// Create a budget, optionally with notification bundles.
    pub async fn create_budget(
        &self,
        account_id: &str,
        request: &BudgetRequest,
        notifications: Option<&[NotificationBundle]>,
    ) -> Result<(), Error> {
        let payload = request.to_wire_format_with(self.prune_mode);
        let bundles = notifications
            .unwrap_or_default()
            .iter()
            .map(NotificationBundle::to_wire_format)
            .collect::<Vec<_>>();

        tracing::info!(
            account_id,
            budget = request.name(),
            notifications = bundles.len(),
            "Creating budget"
        );
        self.api.create_budget(account_id, payload, bundles).await
    }

    /// Replace a budget's definition with `request`.
    pub async fn update_budget(&self, account_id: &str, request: &BudgetRequest) -> Result<(), Error> {
        let payload = request.to_wire_format_with(self.prune_mode);
        tracing::info!(account_id, budget = request.name(), "Updating budget");
        self.api.update_budget(account_id, payload).await
    }

    pub async fn delete_budget(&self, account_id: &str, name: &str) -> Result<(), Error> {
        tracing::info!(account_id, budget = name, "Deleting budget");
        self.api.delete_budget(account_id, name).await
    }
}
