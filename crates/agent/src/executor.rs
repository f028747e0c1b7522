//! Executes the evaluator's action plan.
//!
//! The evaluator is pure and returns a list of [`ScheduledAction`]s; this
//! module owns the side effects: delivering notifications, honoring the
//! pauses between critical alerts, and invoking the shutdown handler.
//! Notification failures are logged and skipped so one broken delivery
//! never stops the rest of the plan.

use trafficwatch_core::evaluate::{Action, ScheduledAction};

use crate::shutdown::ShutdownHandler;
use crate::telegram::Notifier;

/// Counters summarizing one plan execution, for the final log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub shutdown_triggered: bool,
}

/// Execute every step of the plan, in order, to completion.
///
/// There is no cancellation path: if a shutdown is imminent, finishing
/// the alert sequence first is intended behavior.
pub async fn execute(
    plan: &[ScheduledAction],
    notifier: &dyn Notifier,
    shutdown: &dyn ShutdownHandler,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for step in plan {
        match &step.action {
            Action::Notify(notification) => match notifier.send(&notification.text).await {
                Ok(()) => {
                    tracing::info!(severity = ?notification.severity, "Notification sent");
                    report.notifications_sent += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Notification delivery failed, continuing");
                    report.notifications_failed += 1;
                }
            },
            Action::Shutdown(request) => {
                let outcome = shutdown.shutdown(request).await;
                if outcome.attempted && !outcome.success {
                    tracing::error!(message = %outcome.message, "Shutdown did not complete");
                }
                report.shutdown_triggered = true;
            }
        }

        if !step.pause_after.is_zero() {
            tokio::time::sleep(step.pause_after).await;
        }
    }

    report
}
