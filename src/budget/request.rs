//! Budget definitions sent to the create/update calls.
//!
//! # Invariants
//! - A request carries at most one of a fixed limit and auto-adjust data.
//!   This is enforced by [`LimitSpec`]; the builder rejects requests that
//!   supply both with [`Error::ConflictingLimitSpecification`].
//! - `to_wire_format` is pure: the same request always yields the same map.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use super::prune::{prune_object, PruneMode};
use super::WirePayload;
use crate::error::Error;

/// Period a budget's spend is tracked over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Daily,
    Monthly,
    Quarterly,
    Annually,
}

/// What a budget measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetType {
    Usage,
    #[default]
    Cost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoAdjustType {
    Historical,
    Forecast,
}

/// A fixed spending ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetLimit {
    pub amount: Decimal,
    pub unit: String,
}

impl BudgetLimit {
    pub fn new(amount: impl Into<Decimal>, unit: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            unit: unit.into(),
        }
    }

    /// A limit in US dollars.
    pub fn usd(amount: impl Into<Decimal>) -> Self {
        Self::new(amount, "USD")
    }

    /// The amount as the provider expects it: a plain decimal string that
    /// always carries a fractional part (`150` → `"150.0"`). The scale of
    /// `amount` is kept otherwise (`99.950` stays `"99.950"`).
    pub fn amount_string(&self) -> String {
        if self.amount.scale() == 0 {
            format!("{}.0", self.amount)
        } else {
            self.amount.to_string()
        }
    }
}

/// A limit computed by the provider from past or forecast spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoAdjustData {
    pub adjust_type: AutoAdjustType,
    /// Number of prior periods to average.
    pub historical_period: u32,
}

impl AutoAdjustData {
    pub fn historical(periods: u32) -> Self {
        Self {
            adjust_type: AutoAdjustType::Historical,
            historical_period: periods,
        }
    }

    pub fn forecast() -> Self {
        Self {
            adjust_type: AutoAdjustType::Forecast,
            historical_period: 0,
        }
    }
}

/// Which limit, if any, a budget carries.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LimitSpec {
    #[default]
    Unset,
    Fixed(BudgetLimit),
    AutoAdjusted(AutoAdjustData),
}

impl LimitSpec {
    /// Combine two optional limit fields, failing if both are present.
    pub fn from_parts(
        limit: Option<BudgetLimit>,
        auto_adjust: Option<AutoAdjustData>,
    ) -> Result<Self, Error> {
        match (limit, auto_adjust) {
            (Some(_), Some(_)) => Err(Error::ConflictingLimitSpecification),
            (Some(limit), None) => Ok(LimitSpec::Fixed(limit)),
            (None, Some(auto)) => Ok(LimitSpec::AutoAdjusted(auto)),
            (None, None) => Ok(LimitSpec::Unset),
        }
    }
}

/// Filter dimensions restricting which costs count toward a budget.
///
/// Keys are dimension names (`LinkedAccount`, `Service`, `TagKeyValue`);
/// values keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostFilters(BTreeMap<String, Vec<String>>);

impl CostFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn linked_accounts<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimension("LinkedAccount", values)
    }

    pub fn services<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimension("Service", values)
    }

    pub fn tag_key_values<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimension("TagKeyValue", values)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CostTypes {
    /// Whether credits count toward spend.
    pub include_credit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimePeriod {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimePeriod {
    pub fn starting(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// A validated budget definition.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRequest {
    name: String,
    time_unit: TimeUnit,
    cost_filters: CostFilters,
    cost_types: CostTypes,
    limit: LimitSpec,
    period: Option<TimePeriod>,
    budget_type: BudgetType,
}

impl BudgetRequest {
    pub fn builder(name: impl Into<String>, time_unit: TimeUnit) -> BudgetRequestBuilder {
        BudgetRequestBuilder {
            name: name.into(),
            time_unit,
            cost_filters: CostFilters::default(),
            cost_types: CostTypes::default(),
            limit: None,
            auto_adjust: None,
            period: None,
            budget_type: BudgetType::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn budget_type(&self) -> BudgetType {
        self.budget_type
    }

    pub fn cost_filters(&self) -> &CostFilters {
        &self.cost_filters
    }

    pub fn cost_types(&self) -> CostTypes {
        self.cost_types
    }

    pub fn limit(&self) -> &LimitSpec {
        &self.limit
    }

    pub fn period(&self) -> Option<&TimePeriod> {
        self.period.as_ref()
    }

    /// Serialize with the compatible (blanket falsy) prune.
    pub fn to_wire_format(&self) -> WirePayload {
        self.to_wire_format_with(PruneMode::Compatible)
    }

    /// Serialize into the provider's field names, pruned per `mode`.
    pub fn to_wire_format_with(&self, mode: PruneMode) -> WirePayload {
        let mut data = Map::new();
        data.insert("BudgetName".to_string(), json!(self.name));
        data.insert("TimeUnit".to_string(), json!(self.time_unit));
        data.insert("CostFilters".to_string(), json!(self.cost_filters));
        data.insert(
            "CostTypes".to_string(),
            json!({ "IncludeCredit": self.cost_types.include_credit }),
        );

        match &self.limit {
            LimitSpec::Fixed(limit) => {
                data.insert(
                    "BudgetLimit".to_string(),
                    json!({ "Amount": limit.amount_string(), "Unit": limit.unit }),
                );
            }
            LimitSpec::AutoAdjusted(auto) => {
                data.insert(
                    "AutoAdjustData".to_string(),
                    json!({
                        "AutoAdjustType": auto.adjust_type,
                        "HistoricalOptions": {
                            "BudgetAdjustmentPeriod": auto.historical_period,
                        },
                    }),
                );
            }
            LimitSpec::Unset => {}
        }

        if let Some(period) = &self.period {
            data.insert(
                "TimePeriod".to_string(),
                json!({
                    "Start": period.start.map(|t| t.timestamp()),
                    "End": period.end.map(|t| t.timestamp()),
                }),
            );
        }

        data.insert("BudgetType".to_string(), json!(self.budget_type));

        prune_object(data, mode)
    }
}

/// Collects the optional fields of a [`BudgetRequest`].
#[derive(Debug, Clone)]
pub struct BudgetRequestBuilder {
    name: String,
    time_unit: TimeUnit,
    cost_filters: CostFilters,
    cost_types: CostTypes,
    limit: Option<BudgetLimit>,
    auto_adjust: Option<AutoAdjustData>,
    period: Option<TimePeriod>,
    budget_type: BudgetType,
}

impl BudgetRequestBuilder {
    pub fn cost_filters(mut self, cost_filters: CostFilters) -> Self {
        self.cost_filters = cost_filters;
        self
    }

    pub fn cost_types(mut self, cost_types: CostTypes) -> Self {
        self.cost_types = cost_types;
        self
    }

    pub fn include_credit(mut self, include: bool) -> Self {
        self.cost_types.include_credit = include;
        self
    }

    pub fn limit(mut self, limit: BudgetLimit) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn auto_adjust(mut self, auto_adjust: AutoAdjustData) -> Self {
        self.auto_adjust = Some(auto_adjust);
        self
    }

    /// Set the limit from an already-resolved [`LimitSpec`], replacing any
    /// fixed limit or auto-adjust data set before.
    pub fn limit_spec(mut self, resolved: LimitSpec) -> Self {
        (self.limit, self.auto_adjust) = match resolved {
            LimitSpec::Unset => (None, None),
            LimitSpec::Fixed(limit) => (Some(limit), None),
            LimitSpec::AutoAdjusted(auto) => (None, Some(auto)),
        };
        self
    }

    pub fn period(mut self, period: TimePeriod) -> Self {
        self.period = Some(period);
        self
    }

    pub fn budget_type(mut self, budget_type: BudgetType) -> Self {
        self.budget_type = budget_type;
        self
    }

    /// Validate and build the request.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConflictingLimitSpecification` if both a fixed limit
    /// and auto-adjust data were supplied.
    pub fn build(self) -> Result<BudgetRequest, Error> {
        let limit = LimitSpec::from_parts(self.limit, self.auto_adjust)?;
        Ok(BudgetRequest {
            name: self.name,
            time_unit: self.time_unit,
            cost_filters: self.cost_filters,
            cost_types: self.cost_types,
            limit,
            period: self.period,
            budget_type: self.budget_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn monthly() -> BudgetRequestBuilder {
        BudgetRequest::builder("team-alpha", TimeUnit::Monthly).include_credit(true)
    }

    #[test]
    fn test_conflicting_limits_rejected() {
        let result = monthly()
            .limit(BudgetLimit::usd(100))
            .auto_adjust(AutoAdjustData::historical(3))
            .build();
        assert!(matches!(result, Err(Error::ConflictingLimitSpecification)));
    }

    #[test]
    fn test_single_limit_accepted() {
        assert!(monthly().build().is_ok());
        let fixed = monthly().limit(BudgetLimit::usd(100)).build().unwrap();
        assert!(matches!(fixed.limit(), LimitSpec::Fixed(_)));
        let auto = monthly()
            .auto_adjust(AutoAdjustData::forecast())
            .build()
            .unwrap();
        assert!(matches!(auto.limit(), LimitSpec::AutoAdjusted(_)));
    }

    #[test]
    fn test_resolved_limit_spec_keeps_other_fields() {
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let request = BudgetRequest::builder("shared", TimeUnit::Quarterly)
            .cost_types(CostTypes { include_credit: true })
            .budget_type(BudgetType::Usage)
            .period(TimePeriod::starting(start))
            .limit(BudgetLimit::usd(10))
            .limit_spec(LimitSpec::AutoAdjusted(AutoAdjustData::historical(4)))
            .build()
            .unwrap();
        assert_eq!(request.budget_type(), BudgetType::Usage);
        assert!(request.period().is_some());

        let wire = request.to_wire_format();
        assert_eq!(wire["TimeUnit"], "QUARTERLY");
        assert_eq!(wire["BudgetType"], "USAGE");
        assert_eq!(wire["TimePeriod"], json!({"Start": start.timestamp()}));
        assert!(wire.contains_key("AutoAdjustData"));
        assert!(!wire.contains_key("BudgetLimit"));
        assert!(!wire.contains_key("CostFilters"));

        let cleared = monthly()
            .limit(BudgetLimit::usd(10))
            .limit_spec(LimitSpec::Unset)
            .build()
            .unwrap();
        assert_eq!(cleared.limit(), &LimitSpec::Unset);
    }

    #[test]
    fn test_amount_serialized_as_string() {
        let request = monthly()
            .limit(BudgetLimit::new(Decimal::new(1500, 1), "USD"))
            .build()
            .unwrap();
        let wire = request.to_wire_format();
        assert_eq!(wire["BudgetLimit"], json!({"Amount": "150.0", "Unit": "USD"}));

        let whole = monthly().limit(BudgetLimit::usd(150)).build().unwrap();
        assert_eq!(whole.to_wire_format()["BudgetLimit"]["Amount"], "150.0");

        let fractional = monthly()
            .limit(BudgetLimit::usd(Decimal::new(9995, 2)))
            .build()
            .unwrap();
        assert_eq!(fractional.to_wire_format()["BudgetLimit"]["Amount"], "99.95");
    }

    #[test]
    fn test_amount_never_uses_exponent_notation() {
        let cases = [
            (Decimal::from(10_000_000_000_000_000_u64), "10000000000000000.0"),
            (Decimal::from(25_000_000_000_000_000_u64), "25000000000000000.0"),
            (Decimal::new(1, 5), "0.00001"),
            (Decimal::new(1, 1) + Decimal::new(2, 1), "0.3"),
        ];
        for (amount, expected) in cases {
            let request = monthly().limit(BudgetLimit::usd(amount)).build().unwrap();
            assert_eq!(request.to_wire_format()["BudgetLimit"]["Amount"], expected);
        }
    }

    #[test]
    fn test_zero_amount_is_kept() {
        let request = monthly().limit(BudgetLimit::usd(0)).build().unwrap();
        assert_eq!(request.to_wire_format()["BudgetLimit"]["Amount"], "0.0");
    }

    #[test]
    fn test_full_payload_shape() {
        let request = monthly()
            .cost_filters(
                CostFilters::new()
                    .linked_accounts(["111122223333"])
                    .services(Vec::<String>::new()),
            )
            .limit(BudgetLimit::usd(500))
            .build()
            .unwrap();
        let wire = Value::Object(request.to_wire_format());
        assert_eq!(
            wire,
            json!({
                "BudgetName": "team-alpha",
                "TimeUnit": "MONTHLY",
                "BudgetType": "COST",
                "CostFilters": {"LinkedAccount": ["111122223333"]},
                "CostTypes": {"IncludeCredit": true},
                "BudgetLimit": {"Amount": "500.0", "Unit": "USD"},
            })
        );
    }

    #[test]
    fn test_empty_service_dimension_dropped() {
        let request = monthly()
            .cost_filters(
                CostFilters::new()
                    .services(Vec::<String>::new())
                    .tag_key_values(["user:team$alpha"]),
            )
            .build()
            .unwrap();
        assert_eq!(
            request.cost_filters().get("Service"),
            Some(&[][..])
        );
        let wire = request.to_wire_format();
        let filters = wire["CostFilters"].as_object().unwrap();
        assert!(!filters.contains_key("Service"));
        assert!(filters.contains_key("TagKeyValue"));
    }

    #[test]
    fn test_time_period_start_only() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let request = monthly()
            .period(TimePeriod::starting(start))
            .build()
            .unwrap();
        let wire = request.to_wire_format();
        assert_eq!(wire["TimePeriod"], json!({"Start": start.timestamp()}));
    }

    #[test]
    fn test_unset_time_period_dropped() {
        let request = monthly().period(TimePeriod::default()).build().unwrap();
        assert!(!request.to_wire_format().contains_key("TimePeriod"));
    }

    #[test]
    fn test_include_credit_false_dropped_in_compatible_mode() {
        let request = monthly().include_credit(false).build().unwrap();
        let wire = request.to_wire_format();
        assert!(wire
            .get("CostTypes")
            .and_then(|c| c.get("IncludeCredit"))
            .is_none());

        let strict = request.to_wire_format_with(PruneMode::EmptyOnly);
        assert_eq!(strict["CostTypes"], json!({"IncludeCredit": false}));
    }

    #[test]
    fn test_auto_adjust_shape() {
        let request = monthly()
            .auto_adjust(AutoAdjustData::historical(6))
            .build()
            .unwrap();
        let wire = request.to_wire_format();
        assert_eq!(
            wire["AutoAdjustData"],
            json!({
                "AutoAdjustType": "HISTORICAL",
                "HistoricalOptions": {"BudgetAdjustmentPeriod": 6},
            })
        );
        assert!(!wire.contains_key("BudgetLimit"));
    }

    #[test]
    fn test_serialization_is_repeatable() {
        let request = monthly()
            .budget_type(BudgetType::Usage)
            .limit(BudgetLimit::new(Decimal::new(125, 1), "GBP"))
            .build()
            .unwrap();
        assert_eq!(request.to_wire_format(), request.to_wire_format());
        assert_eq!(request.to_wire_format()["BudgetType"], "USAGE");
    }
}
