//! Severity tiers and the thresholds that bound them.

use serde::Serialize;

use crate::error::CoreError;

/// Severity classification of remaining quota against configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Below the critical threshold; the host is shut down.
    Critical,
    /// Below the warning threshold; hourly alerts.
    Warning,
    /// Below the notice threshold; periodic low-balance alerts.
    Notice,
    /// At or above the notice threshold; periodic usage reports.
    Sufficient,
}

/// Tier boundaries in GB, ascending: `critical <= warning <= notice`.
///
/// Classification is only meaningful under that ordering; [`Thresholds::validate`]
/// should be called once at startup before any evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub critical: f64,
    pub warning: f64,
    pub notice: f64,
}

impl Thresholds {
    /// Classify a remaining amount.
    ///
    /// Boundaries belong to the less severe tier: `[critical, warning)` is
    /// `Warning`, so `amount == warning` classifies as `Notice`.
    pub fn classify(&self, amount: f64) -> Tier {
        if amount < self.critical {
            Tier::Critical
        } else if amount < self.warning {
            Tier::Warning
        } else if amount < self.notice {
            Tier::Notice
        } else {
            Tier::Sufficient
        }
    }

    /// Validate the ascending ordering invariant.
    ///
    /// Returns a `CoreError::Validation` naming the offending values.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.critical <= self.warning && self.warning <= self.notice) {
            return Err(CoreError::Validation(format!(
                "thresholds must be ascending: critical={} warning={} notice={}",
                self.critical, self.warning, self.notice
            )));
        }
        Ok(())
    }
}
