//! Notification rules and their subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    #[default]
    Actual,
    Forecasted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    #[default]
    GreaterThan,
    LessThan,
    EqualTo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdType {
    #[default]
    Percentage,
    AbsoluteValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationState {
    #[default]
    Alarm,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionType {
    Email,
    #[default]
    Sns,
}

/// A threshold-crossing condition on a budget.
///
/// Also the shape returned by the describe-notifications call; fields the
/// provider omits fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NotificationRule {
    pub notification_type: NotificationType,
    pub comparison_operator: ComparisonOperator,
    pub threshold: f64,
    pub threshold_type: ThresholdType,
    pub notification_state: NotificationState,
}

impl NotificationRule {
    pub fn new(
        notification_type: NotificationType,
        comparison_operator: ComparisonOperator,
        threshold: f64,
        threshold_type: ThresholdType,
    ) -> Self {
        Self {
            notification_type,
            comparison_operator,
            threshold,
            threshold_type,
            notification_state: NotificationState::default(),
        }
    }

    /// Alert when actual spend exceeds `percent` of the limit.
    pub fn actual_over_percent(percent: f64) -> Self {
        Self::new(
            NotificationType::Actual,
            ComparisonOperator::GreaterThan,
            percent,
            ThresholdType::Percentage,
        )
    }

    /// Alert when forecast spend exceeds `percent` of the limit.
    pub fn forecast_over_percent(percent: f64) -> Self {
        Self::new(
            NotificationType::Forecasted,
            ComparisonOperator::GreaterThan,
            percent,
            ThresholdType::Percentage,
        )
    }

    pub fn with_state(mut self, state: NotificationState) -> Self {
        self.notification_state = state;
        self
    }
}

/// Destination for a triggered alert.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationSubscriber {
    pub subscription_type: SubscriptionType,
    pub address: String,
}

impl NotificationSubscriber {
    pub fn email(address: impl Into<String>) -> Self {
        Self {
            subscription_type: SubscriptionType::Email,
            address: address.into(),
        }
    }

    pub fn sns(topic_arn: impl Into<String>) -> Self {
        Self {
            subscription_type: SubscriptionType::Sns,
            address: topic_arn.into(),
        }
    }
}

/// A rule together with the subscribers it notifies.
///
/// Subscribers keep insertion order. The provider expects at least one;
/// that is not checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationBundle {
    #[serde(rename = "Notification")]
    pub rule: NotificationRule,
    #[serde(rename = "Subscribers")]
    pub subscribers: Vec<NotificationSubscriber>,
}

impl NotificationBundle {
    pub fn new(rule: NotificationRule) -> Self {
        Self {
            rule,
            subscribers: Vec::new(),
        }
    }

    pub fn subscriber(mut self, subscriber: NotificationSubscriber) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Serialize for the create call. No pruning: every rule field is sent.
    pub fn to_wire_format(&self) -> Value {
        serde_json::json!(self)
    }
}
