//! Budget module - request shapes, serialization and the budget service.
//!
//! # Key Concepts
//! - Request: a validated budget definition, serialized to the provider's payload
//! - Notification: threshold rules and the subscribers they alert
//! - Record: budgets as the describe calls return them
//! - Service: call composition over a [`crate::api::BudgetsApi`]

mod notification;
mod prune;
mod record;
mod request;
mod service;

pub use notification::{
    ComparisonOperator, NotificationBundle, NotificationRule, NotificationState,
    NotificationSubscriber, NotificationType, SubscriptionType, ThresholdType,
};
pub use prune::PruneMode;
pub use record::{BudgetRecord, BudgetWithNotifications, Spend};
pub use request::{
    AutoAdjustData, AutoAdjustType, BudgetLimit, BudgetRequest, BudgetRequestBuilder,
    BudgetType, CostFilters, CostTypes, LimitSpec, TimePeriod, TimeUnit,
};
pub use service::BudgetService;

pub use rust_decimal::Decimal;

/// Request body mapping sent to the create/update calls.
pub type WirePayload = serde_json::Map<String, serde_json::Value>;
