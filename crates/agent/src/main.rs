//! `trafficwatch-agent` -- free-traffic quota monitor.
//!
//! Invoked on a fixed schedule (cron or a systemd timer). Each run
//! fetches the remaining free-resource quota from the billing API,
//! classifies it against the configured thresholds, notifies a Telegram
//! chat with tier-dependent debouncing, and shuts the host down when the
//! quota is critically low.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default                         | Description                          |
//! |----------------------|----------|---------------------------------|--------------------------------------|
//! | `HUAWEICLOUD_SDK_AK` | yes      | --                              | Billing API access key               |
//! | `HUAWEICLOUD_SDK_SK` | yes      | --                              | Billing API secret key               |
//! | `FREE_RESOURCE_IDS`  | yes      | --                              | Comma-separated free-resource ids    |
//! | `SERVER_NAME`        | no       | `default-server`                | Display name used in alerts          |
//! | `THRESHOLD_LEVEL_1`  | no       | `200`                           | Critical threshold (GB)              |
//! | `THRESHOLD_LEVEL_2`  | no       | `300`                           | Warning threshold (GB)               |
//! | `THRESHOLD_LEVEL_3`  | no       | `500`                           | Notice threshold (GB)                |
//! | `DEBUG_MODE`         | no       | `false`                         | Disable all debounce gating          |
//! | `TELEGRAM_BOT_TOKEN` | no       | --                              | Bot token; alerts dropped if absent  |
//! | `TELEGRAM_CHAT_ID`   | no       | --                              | Target chat id                       |
//! | `STATE_FILE`         | no       | `<tmp>/trafficwatch_state.json` | Debounce-state location              |

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trafficwatch_agent::billing::{self, BillingClient, BillingError};
use trafficwatch_agent::config::AgentConfig;
use trafficwatch_agent::executor;
use trafficwatch_agent::shutdown::HostShutdown;
use trafficwatch_agent::state::{FileStateStore, StateStore};
use trafficwatch_agent::telegram::{Notifier, NullNotifier, TelegramNotifier};

use trafficwatch_core::evaluate::{self, EvalConfig};
use trafficwatch_core::signing::Credentials;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trafficwatch_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AgentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Monitor run failed");
        std::process::exit(1);
    }
}

async fn run(config: AgentConfig) -> Result<(), BillingError> {
    tracing::info!(
        server = %config.server_name,
        resources = config.resource_ids.len(),
        debug_mode = config.debug_mode,
        "Starting trafficwatch-agent",
    );

    let billing = BillingClient::new(
        billing::DEFAULT_ENDPOINT,
        Credentials {
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
        },
    );

    // Fetch before touching state: a failed fetch leaves the previous
    // state intact, so the next scheduled run retries from it.
    let records = billing.fetch_usage(&config.resource_ids).await?;
    if records.is_empty() {
        tracing::warn!("Billing API returned no free resources");
        return Ok(());
    }
    for record in &records {
        tracing::info!(
            resource = %record.resource_id,
            remaining_gb = record.amount,
            total_gb = record.original_amount,
            usage_type = %record.usage_type_name,
            "Fetched usage record",
        );
    }

    let store = FileStateStore::new(&config.state_file);
    let state = store.load();

    let eval_config = EvalConfig {
        thresholds: config.thresholds,
        server_name: config.server_name.clone(),
        debug_mode: config.debug_mode,
    };
    let now = chrono::Utc::now().timestamp();
    let evaluation = evaluate::evaluate(&records, state, &eval_config, now);

    if evaluation.plan.is_empty() {
        tracing::info!("No actions this cycle");
    }

    let notifier: Box<dyn Notifier> =
        match (&config.telegram_bot_token, &config.telegram_chat_id) {
            (Some(token), Some(chat_id)) => {
                Box::new(TelegramNotifier::new(token.clone(), chat_id.clone()))
            }
            _ => {
                tracing::warn!("Telegram credentials not configured; notifications will be dropped");
                Box::new(NullNotifier)
            }
        };

    let report = executor::execute(&evaluation.plan, notifier.as_ref(), &HostShutdown).await;
    tracing::info!(
        sent = report.notifications_sent,
        failed = report.notifications_failed,
        shutdown = report.shutdown_triggered,
        "Plan executed",
    );

    if let Err(e) = store.save(&evaluation.state) {
        // Actions already taken are not rolled back; a lost save only
        // risks a duplicate notification next cycle.
        tracing::warn!(
            error = %e,
            path = %config.state_file.display(),
            "Failed to persist monitor state",
        );
    }

    Ok(())
}
