//! Monitor state persisted between invocations.

use serde::{Deserialize, Serialize};

/// Debounce clocks carried across invocations.
///
/// Timestamps are unix seconds; `0` means "never". A missing field and a
/// missing state file both deserialize to zero, so a fresh install or a
/// lost file passes every debounce window on the next run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorState {
    /// Last time a tier-appropriate check actually executed (not skipped
    /// by the run-debounce).
    #[serde(default)]
    pub last_run_time: i64,
    /// Last time a notification was actually sent.
    #[serde(default)]
    pub last_notify_time: i64,
}
