//! Host shutdown runner.
//!
//! Executes `sudo shutdown -h now` when the evaluator decides the quota
//! is critically low. Linux only; on other platforms the request is
//! logged and skipped. A timeout is applied so a hung command cannot
//! keep the process alive indefinitely.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use trafficwatch_core::evaluate::ShutdownRequest;

/// Timeout for the shutdown command itself.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of a shutdown attempt, for the operator log.
#[derive(Debug, Clone)]
pub struct ShutdownOutcome {
    /// Whether a shutdown command was actually executed.
    pub attempted: bool,
    pub success: bool,
    pub message: String,
}

/// Seam for the platform shutdown action.
#[async_trait]
pub trait ShutdownHandler: Send + Sync {
    async fn shutdown(&self, request: &ShutdownRequest) -> ShutdownOutcome;
}

/// Powers off the host via the system shutdown command.
pub struct HostShutdown;

#[async_trait]
impl ShutdownHandler for HostShutdown {
    async fn shutdown(&self, request: &ShutdownRequest) -> ShutdownOutcome {
        if !cfg!(target_os = "linux") {
            tracing::warn!(
                server = %request.server_name,
                "Non-Linux platform detected, skipping shutdown command",
            );
            return ShutdownOutcome {
                attempted: false,
                success: false,
                message: "shutdown is not supported on this platform".to_string(),
            };
        }
        run_shutdown_command(request).await
    }
}

async fn run_shutdown_command(request: &ShutdownRequest) -> ShutdownOutcome {
    tracing::info!(
        server = %request.server_name,
        resource = %request.resource_id,
        remaining_gb = request.remaining_gb,
        "Executing shutdown command",
    );

    let result = tokio::time::timeout(
        SHUTDOWN_TIMEOUT,
        Command::new("sudo").args(["shutdown", "-h", "now"]).output(),
    )
    .await;

    match result {
        Ok(Ok(output)) if output.status.success() => ShutdownOutcome {
            attempted: true,
            success: true,
            message: "shutdown command issued".to_string(),
        },
        Ok(Ok(output)) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(
                exit_code = output.status.code().unwrap_or(-1),
                stderr = %stderr.trim(),
                "Shutdown command failed",
            );
            ShutdownOutcome {
                attempted: true,
                success: false,
                message: format!(
                    "shutdown command failed (exit {}): {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim(),
                ),
            }
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to execute shutdown command");
            ShutdownOutcome {
                attempted: true,
                success: false,
                message: format!("failed to execute shutdown: {e}"),
            }
        }
        Err(_) => {
            tracing::error!("Shutdown command timed out");
            ShutdownOutcome {
                attempted: true,
                success: false,
                message: format!(
                    "shutdown command timed out after {}s",
                    SHUTDOWN_TIMEOUT.as_secs(),
                ),
            }
        }
    }
}
