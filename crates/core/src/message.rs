//! Markdown alert text for each severity tier.
//!
//! Messages are rendered for Telegram's Markdown parse mode: bold server
//! name and amounts, an emoji frame per tier, and the billing period with
//! the timestamps truncated to their date part.

use crate::usage::UsageRecord;

/// Truncate an ISO-like timestamp to its `YYYY-MM-DD` prefix.
fn short_date(value: &str) -> &str {
    value.get(..10).unwrap_or(value)
}

fn billing_period(record: &UsageRecord) -> String {
    format!(
        "{} to {}",
        short_date(&record.period_start),
        short_date(&record.period_end)
    )
}

/// One of the escalating alerts sent before a shutdown (`step` is 1-based).
pub fn critical_alert(server_name: &str, record: &UsageRecord, step: usize, total: usize) -> String {
    format!(
        "\u{203c}\u{fe0f} *URGENT* \u{203c}\u{fe0f}\n\
         Server: *{server_name}*\n\
         Remaining traffic: *{:.2} GB*, critically low! The server is about to shut down!\n\
         Plan total: *{:.2} GB*\n\
         Usage type: *{}*\n\
         Billing period: {}\n\
         (alert {step}/{total})",
        record.amount,
        record.original_amount,
        record.usage_type_name,
        billing_period(record),
    )
}

/// The final notice sent right before the shutdown command runs.
pub fn critical_final(server_name: &str) -> String {
    format!("Server *{server_name}* is shutting down.")
}

pub fn warning(server_name: &str, record: &UsageRecord, threshold: f64) -> String {
    format!(
        "\u{1f7e0} *WARNING* \u{1f7e0}\n\
         Server: *{server_name}*\n\
         Remaining traffic is *{:.2} GB*, below {threshold} GB.\n\
         Plan total: *{:.2} GB*\n\
         Usage type: *{}*\n\
         Billing period: {}",
        record.amount,
        record.original_amount,
        record.usage_type_name,
        billing_period(record),
    )
}

pub fn notice(server_name: &str, record: &UsageRecord, threshold: f64) -> String {
    format!(
        "\u{1f7e1} *LOW BALANCE* \u{1f7e1}\n\
         Server: *{server_name}*\n\
         Remaining traffic is *{:.2} GB*, below {threshold} GB.\n\
         Plan total: *{:.2} GB*\n\
         Usage type: *{}*\n\
         Billing period: {}",
        record.amount,
        record.original_amount,
        record.usage_type_name,
        billing_period(record),
    )
}

pub fn sufficient(server_name: &str, record: &UsageRecord) -> String {
    format!(
        "\u{1f7e2} *USAGE REPORT* \u{1f7e2}\n\
         Server: *{server_name}*\n\
         Current remaining traffic is *{:.2} GB*.\n\
         Plan total: *{:.2} GB*\n\
         Usage type: *{}*\n\
         Billing period: {}",
        record.amount,
        record.original_amount,
        record.usage_type_name,
        billing_period(record),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UsageRecord {
        UsageRecord {
            resource_id: "res-001".to_string(),
            amount: 250.5,
            original_amount: 500.0,
            period_start: "2025-08-01T00:00:00Z".to_string(),
            period_end: "2025-09-01T00:00:00Z".to_string(),
            usage_type_name: "Traffic".to_string(),
        }
    }

    #[test]
    fn billing_period_truncates_to_dates() {
        assert_eq!(billing_period(&record()), "2025-08-01 to 2025-09-01");
    }

    #[test]
    fn short_date_tolerates_short_values() {
        assert_eq!(short_date("N/A"), "N/A");
        assert_eq!(short_date(""), "");
        assert_eq!(short_date("2025-08-01T12:00:00Z"), "2025-08-01");
    }

    #[test]
    fn warning_includes_amounts_and_threshold() {
        let text = warning("web-1", &record(), 300.0);
        assert!(text.contains("*web-1*"));
        assert!(text.contains("*250.50 GB*"));
        assert!(text.contains("below 300 GB"));
        assert!(text.contains("*500.00 GB*"));
        assert!(text.contains("2025-08-01 to 2025-09-01"));
    }

    #[test]
    fn critical_alert_carries_step_counter() {
        let text = critical_alert("web-1", &record(), 3, 10);
        assert!(text.contains("(alert 3/10)"));
        assert!(text.contains("*URGENT*"));
    }

    #[test]
    fn each_tier_has_a_distinct_frame() {
        let r = record();
        assert!(critical_alert("s", &r, 1, 10).starts_with('\u{203c}'));
        assert!(warning("s", &r, 300.0).starts_with('\u{1f7e0}'));
        assert!(notice("s", &r, 500.0).starts_with('\u{1f7e1}'));
        assert!(sufficient("s", &r).starts_with('\u{1f7e2}'));
    }
}
