//! The pure evaluation core: tier dispatch, debounce clocks, action plan.
//!
//! [`evaluate`] is a pure function over usage records, the persisted
//! [`MonitorState`], and an immutable [`EvalConfig`]. It performs no I/O
//! and cannot fail; every side effect it decides on is returned as a
//! [`ScheduledAction`] for the caller to execute. Delays (the spacing of
//! the critical alert burst) are part of the plan, not slept here, so the
//! execution strategy stays swappable.
//!
//! Two independent debounce clocks gate the non-critical tiers:
//!
//! * `last_run_time` throttles how often a tier does meaningful work at
//!   all, protecting against a very frequent scheduler cadence;
//! * `last_notify_time` throttles how often a human is actually paged.
//!
//! The clocks are decoupled so state can be refreshed more often than
//! users are alerted.

use std::time::Duration;

use crate::message;
use crate::state::MonitorState;
use crate::tier::Tier;
use crate::usage::UsageRecord;

pub use crate::tier::Thresholds;

/// Run-debounce for the Warning tier.
pub const WARNING_RUN_DEBOUNCE_SECS: i64 = 3600;
/// Run-debounce for the Notice and Sufficient tiers.
pub const ROUTINE_RUN_DEBOUNCE_SECS: i64 = 4 * 3600;
/// Notify-debounce for the Notice and Sufficient tiers.
pub const ROUTINE_NOTIFY_DEBOUNCE_SECS: i64 = 24 * 3600;
/// Number of escalating alerts sent before the shutdown action.
pub const CRITICAL_ALERT_COUNT: usize = 10;
/// Spacing between successive critical alerts.
pub const CRITICAL_ALERT_SPACING: Duration = Duration::from_secs(5);

/// Immutable per-invocation evaluation settings.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub thresholds: Thresholds,
    /// Display name used in every alert message.
    pub server_name: String,
    /// Disables every debounce window: always run, always notify.
    pub debug_mode: bool,
}

/// A notification to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub severity: Tier,
}

/// A request to power off the monitored host.
#[derive(Debug, Clone, PartialEq)]
pub struct ShutdownRequest {
    pub server_name: String,
    /// Resource that drove the decision, for the operator log.
    pub resource_id: String,
    pub remaining_gb: f64,
}

/// One side effect the caller must perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Notify(Notification),
    Shutdown(ShutdownRequest),
}

/// An action plus how long the executor should pause after performing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledAction {
    pub action: Action,
    pub pause_after: Duration,
}

impl ScheduledAction {
    fn immediate(action: Action) -> Self {
        Self {
            action,
            pause_after: Duration::ZERO,
        }
    }
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// State to persist for the next invocation.
    pub state: MonitorState,
    /// Actions to execute, in order.
    pub plan: Vec<ScheduledAction>,
}

/// Evaluate all records against the thresholds and debounce clocks.
///
/// Records are processed in the order received. A Critical record emits
/// the full shutdown sequence and aborts processing of the remaining
/// records: the host is going down regardless of their status. `now` is
/// unix seconds, supplied by the caller so evaluation stays deterministic.
pub fn evaluate(
    records: &[UsageRecord],
    state: MonitorState,
    config: &EvalConfig,
    now: i64,
) -> Evaluation {
    let mut state = state;
    let mut plan = Vec::new();

    for record in records {
        match config.thresholds.classify(record.amount) {
            Tier::Critical => {
                push_critical_sequence(&mut plan, config, record);
                break;
            }
            Tier::Warning => {
                if !config.debug_mode && now - state.last_run_time < WARNING_RUN_DEBOUNCE_SECS {
                    continue;
                }
                plan.push(ScheduledAction::immediate(Action::Notify(Notification {
                    text: message::warning(&config.server_name, record, config.thresholds.warning),
                    severity: Tier::Warning,
                })));
                // Warning always notifies when it runs, so both clocks
                // advance together.
                state.last_run_time = now;
                state.last_notify_time = now;
            }
            tier @ (Tier::Notice | Tier::Sufficient) => {
                if !config.debug_mode && now - state.last_run_time < ROUTINE_RUN_DEBOUNCE_SECS {
                    continue;
                }
                state.last_run_time = now;
                if config.debug_mode
                    || now - state.last_notify_time > ROUTINE_NOTIFY_DEBOUNCE_SECS
                {
                    let text = if tier == Tier::Notice {
                        message::notice(&config.server_name, record, config.thresholds.notice)
                    } else {
                        message::sufficient(&config.server_name, record)
                    };
                    plan.push(ScheduledAction::immediate(Action::Notify(Notification {
                        text,
                        severity: tier,
                    })));
                    state.last_notify_time = now;
                }
            }
        }
    }

    Evaluation { state, plan }
}

/// Emit the Critical-tier sequence: [`CRITICAL_ALERT_COUNT`] escalating
/// alerts spaced [`CRITICAL_ALERT_SPACING`] apart, one final shutdown
/// notice, then the shutdown action itself.
fn push_critical_sequence(
    plan: &mut Vec<ScheduledAction>,
    config: &EvalConfig,
    record: &UsageRecord,
) {
    for step in 1..=CRITICAL_ALERT_COUNT {
        plan.push(ScheduledAction {
            action: Action::Notify(Notification {
                text: message::critical_alert(
                    &config.server_name,
                    record,
                    step,
                    CRITICAL_ALERT_COUNT,
                ),
                severity: Tier::Critical,
            }),
            pause_after: CRITICAL_ALERT_SPACING,
        });
    }
    plan.push(ScheduledAction::immediate(Action::Notify(Notification {
        text: message::critical_final(&config.server_name),
        severity: Tier::Critical,
    })));
    plan.push(ScheduledAction::immediate(Action::Shutdown(
        ShutdownRequest {
            server_name: config.server_name.clone(),
            resource_id: record.resource_id.clone(),
            remaining_gb: record.amount,
        },
    )));
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_750_000_000;

    fn config() -> EvalConfig {
        EvalConfig {
            thresholds: Thresholds {
                critical: 200.0,
                warning: 300.0,
                notice: 500.0,
            },
            server_name: "web-1".to_string(),
            debug_mode: false,
        }
    }

    fn record(amount: f64) -> UsageRecord {
        UsageRecord {
            resource_id: "res-001".to_string(),
            amount,
            original_amount: 1000.0,
            period_start: "2025-08-01T00:00:00Z".to_string(),
            period_end: "2025-09-01T00:00:00Z".to_string(),
            usage_type_name: "Traffic".to_string(),
        }
    }

    fn notify_count(plan: &[ScheduledAction]) -> usize {
        plan.iter()
            .filter(|s| matches!(s.action, Action::Notify(_)))
            .count()
    }

    fn shutdown_count(plan: &[ScheduledAction]) -> usize {
        plan.iter()
            .filter(|s| matches!(s.action, Action::Shutdown(_)))
            .count()
    }

    // -----------------------------------------------------------------
    // Critical tier
    // -----------------------------------------------------------------

    #[test]
    fn critical_emits_eleven_notifications_and_one_shutdown() {
        let result = evaluate(&[record(150.0)], MonitorState::default(), &config(), NOW);

        assert_eq!(notify_count(&result.plan), 11);
        assert_eq!(shutdown_count(&result.plan), 1);
        // Shutdown is the final step.
        assert!(matches!(
            result.plan.last().map(|s| &s.action),
            Some(Action::Shutdown(_))
        ));
    }

    #[test]
    fn critical_alerts_are_spaced_and_counted() {
        let result = evaluate(&[record(150.0)], MonitorState::default(), &config(), NOW);

        for (i, step) in result.plan.iter().take(CRITICAL_ALERT_COUNT).enumerate() {
            assert_eq!(step.pause_after, CRITICAL_ALERT_SPACING);
            match &step.action {
                Action::Notify(n) => {
                    assert_eq!(n.severity, Tier::Critical);
                    assert!(n.text.contains(&format!("(alert {}/10)", i + 1)));
                }
                other => panic!("expected Notify, got {other:?}"),
            }
        }
        // The final notice and the shutdown itself carry no pause.
        assert_eq!(result.plan[CRITICAL_ALERT_COUNT].pause_after, Duration::ZERO);
        assert_eq!(
            result.plan[CRITICAL_ALERT_COUNT + 1].pause_after,
            Duration::ZERO
        );
    }

    #[test]
    fn critical_ignores_prior_state_and_debug_mode() {
        let recent = MonitorState {
            last_run_time: NOW,
            last_notify_time: NOW,
        };
        let mut cfg = config();
        cfg.debug_mode = true;

        let result = evaluate(&[record(0.0)], recent, &cfg, NOW);
        assert_eq!(notify_count(&result.plan), 11);
        assert_eq!(shutdown_count(&result.plan), 1);
    }

    #[test]
    fn critical_halts_processing_of_later_records() {
        // Scenario A: the second record would be a Warning notification,
        // but the shutdown sequence aborts the loop.
        let records = [record(150.0), record(250.0)];
        let result = evaluate(&records, MonitorState::default(), &config(), NOW);

        assert_eq!(notify_count(&result.plan), 11);
        assert_eq!(shutdown_count(&result.plan), 1);
        // State untouched: nothing after the shutdown sequence ran.
        assert_eq!(result.state, MonitorState::default());
    }

    #[test]
    fn shutdown_request_names_the_triggering_resource() {
        let result = evaluate(&[record(150.0)], MonitorState::default(), &config(), NOW);

        match &result.plan.last().expect("non-empty plan").action {
            Action::Shutdown(req) => {
                assert_eq!(req.server_name, "web-1");
                assert_eq!(req.resource_id, "res-001");
                assert_eq!(req.remaining_gb, 150.0);
            }
            other => panic!("expected Shutdown, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------
    // Warning tier
    // -----------------------------------------------------------------

    #[test]
    fn warning_within_run_debounce_is_skipped() {
        let state = MonitorState {
            last_run_time: NOW - 600,
            last_notify_time: NOW - 600,
        };

        let result = evaluate(&[record(250.0)], state, &config(), NOW);
        assert!(result.plan.is_empty());
        assert_eq!(result.state, state);
    }

    #[test]
    fn warning_after_debounce_notifies_and_stamps_both_clocks() {
        // Scenario B: 3700 s since the last run is past the 1 h window.
        let state = MonitorState {
            last_run_time: NOW - 3700,
            last_notify_time: NOW - 3700,
        };

        let result = evaluate(&[record(250.0)], state, &config(), NOW);

        assert_eq!(notify_count(&result.plan), 1);
        assert_eq!(shutdown_count(&result.plan), 0);
        assert_eq!(result.state.last_run_time, NOW);
        assert_eq!(result.state.last_notify_time, NOW);

        match &result.plan[0].action {
            Action::Notify(n) => {
                assert_eq!(n.severity, Tier::Warning);
                assert!(n.text.contains("below 300 GB"));
            }
            other => panic!("expected Notify, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------
    // Notice / Sufficient tiers
    // -----------------------------------------------------------------

    #[test]
    fn notice_refreshes_run_clock_without_notifying() {
        // Scenario C: the run window (4 h) has elapsed but the notify
        // window (24 h) has not.
        let state = MonitorState {
            last_run_time: NOW - 5 * 3600,
            last_notify_time: NOW - 10 * 3600,
        };

        let result = evaluate(&[record(400.0)], state, &config(), NOW);

        assert!(result.plan.is_empty());
        assert_eq!(result.state.last_run_time, NOW);
        assert_eq!(result.state.last_notify_time, NOW - 10 * 3600);
    }

    #[test]
    fn notice_notifies_after_both_windows_elapse() {
        let state = MonitorState {
            last_run_time: NOW - 5 * 3600,
            last_notify_time: NOW - 25 * 3600,
        };

        let result = evaluate(&[record(400.0)], state, &config(), NOW);

        assert_eq!(notify_count(&result.plan), 1);
        assert_eq!(result.state.last_run_time, NOW);
        assert_eq!(result.state.last_notify_time, NOW);
        match &result.plan[0].action {
            Action::Notify(n) => assert_eq!(n.severity, Tier::Notice),
            other => panic!("expected Notify, got {other:?}"),
        }
    }

    #[test]
    fn notice_within_run_debounce_is_skipped() {
        let state = MonitorState {
            last_run_time: NOW - 3600,
            last_notify_time: 0,
        };

        let result = evaluate(&[record(400.0)], state, &config(), NOW);
        assert!(result.plan.is_empty());
        assert_eq!(result.state, state);
    }

    #[test]
    fn sufficient_uses_report_framing() {
        let state = MonitorState {
            last_run_time: NOW - 5 * 3600,
            last_notify_time: NOW - 25 * 3600,
        };

        let result = evaluate(&[record(800.0)], state, &config(), NOW);

        assert_eq!(notify_count(&result.plan), 1);
        match &result.plan[0].action {
            Action::Notify(n) => {
                assert_eq!(n.severity, Tier::Sufficient);
                assert!(n.text.contains("USAGE REPORT"));
            }
            other => panic!("expected Notify, got {other:?}"),
        }
    }

    #[test]
    fn boundary_amount_equal_to_warning_threshold_is_notice() {
        let state = MonitorState {
            last_run_time: NOW - 5 * 3600,
            last_notify_time: NOW - 25 * 3600,
        };

        let result = evaluate(&[record(300.0)], state, &config(), NOW);

        assert_eq!(notify_count(&result.plan), 1);
        match &result.plan[0].action {
            Action::Notify(n) => assert_eq!(n.severity, Tier::Notice),
            other => panic!("expected Notify, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------
    // Debug mode
    // -----------------------------------------------------------------

    #[test]
    fn debug_mode_bypasses_every_debounce() {
        let recent = MonitorState {
            last_run_time: NOW,
            last_notify_time: NOW,
        };
        let mut cfg = config();
        cfg.debug_mode = true;

        for amount in [250.0, 400.0, 800.0] {
            let result = evaluate(&[record(amount)], recent, &cfg, NOW);
            assert_eq!(notify_count(&result.plan), 1, "amount {amount}");
            assert_eq!(result.state.last_run_time, NOW);
            assert_eq!(result.state.last_notify_time, NOW);
        }
    }

    // -----------------------------------------------------------------
    // Zero state / idempotence
    // -----------------------------------------------------------------

    #[test]
    fn zero_state_always_runs_and_notifies() {
        // Scenario D: a missing state file reads as both clocks at zero,
        // so the first invocation acts immediately for every tier above
        // critical.
        for amount in [250.0, 400.0, 800.0] {
            let result = evaluate(&[record(amount)], MonitorState::default(), &config(), NOW);
            assert_eq!(notify_count(&result.plan), 1, "amount {amount}");
            assert_eq!(result.state.last_run_time, NOW);
            assert_eq!(result.state.last_notify_time, NOW);
        }
    }

    #[test]
    fn immediate_reevaluation_never_notifies_twice() {
        for amount in [250.0, 400.0, 800.0] {
            let first = evaluate(&[record(amount)], MonitorState::default(), &config(), NOW);
            assert_eq!(notify_count(&first.plan), 1, "amount {amount}");

            let second = evaluate(&[record(amount)], first.state, &config(), NOW);
            assert!(second.plan.is_empty(), "amount {amount}");
            assert_eq!(second.state, first.state);
        }
    }

    // -----------------------------------------------------------------
    // Multiple records
    // -----------------------------------------------------------------

    #[test]
    fn records_are_processed_in_order() {
        // The first record runs and stamps the clocks; with the clocks at
        // `now` the second record is inside both debounce windows.
        let records = [record(250.0), record(400.0)];
        let result = evaluate(&records, MonitorState::default(), &config(), NOW);

        assert_eq!(notify_count(&result.plan), 1);
        match &result.plan[0].action {
            Action::Notify(n) => assert_eq!(n.severity, Tier::Warning),
            other => panic!("expected Notify, got {other:?}"),
        }
    }

    #[test]
    fn empty_record_list_is_a_no_op() {
        let state = MonitorState {
            last_run_time: 42,
            last_notify_time: 17,
        };
        let result = evaluate(&[], state, &config(), NOW);
        assert!(result.plan.is_empty());
        assert_eq!(result.state, state);
    }
}
