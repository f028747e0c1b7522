//! Free-resource usage records returned by the billing API.

use serde::Deserialize;

/// Remaining free-quota snapshot for a single billing-cycle resource.
///
/// Field names are mapped from the billing API wire format
/// (`free_resource_id`, `start_time`, `end_time`). Amounts are in GB.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UsageRecord {
    /// Provider-assigned identifier for the free resource.
    #[serde(rename = "free_resource_id", default)]
    pub resource_id: String,
    /// Remaining quota for the current billing cycle.
    #[serde(default)]
    pub amount: f64,
    /// Total quota for the billing cycle.
    #[serde(default)]
    pub original_amount: f64,
    /// Billing period start, ISO-like date-time string.
    #[serde(rename = "start_time", default = "unknown_field")]
    pub period_start: String,
    /// Billing period end.
    #[serde(rename = "end_time", default = "unknown_field")]
    pub period_end: String,
    /// Human-readable usage type label.
    #[serde(default = "unknown_field")]
    pub usage_type_name: String,
}

fn unknown_field() -> String {
    "N/A".to_string()
}
