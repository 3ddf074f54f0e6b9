use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::output::OutputOptions;
use crate::core::config::AppConfig;
use crate::core::monitor::{Monitor, MonitorConfig};
use crate::core::notify::{LogSink, NotificationSink, WebhookSink};
use crate::core::subscription::SubscriptionClient;

/// Run the periodic monitor until ctrl-c.
pub async fn run(url: Option<String>, _opts: &OutputOptions) -> Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    for issue in config.validate() {
        warn!(issue = %issue, "config problem");
    }

    let Some(url) = url.or_else(|| config.subscription_url.clone()) else {
        eprintln!("No subscription URL configured. Pass --url or run `subw config init`.");
        std::process::exit(1);
    };

    let provider = SubscriptionClient::new(url)?;
    let sink: Box<dyn NotificationSink> = match &config.webhook_url {
        Some(webhook) => {
            info!(webhook = %webhook, "notifications go to webhook");
            Box::new(WebhookSink::new(webhook.clone())?)
        }
        None => {
            info!("no webhook configured; notifications go to the log");
            Box::new(LogSink)
        }
    };

    let (monitor, handle) = Monitor::new(
        Box::new(provider),
        sink,
        MonitorConfig::from(&config),
    );
    info!(
        check_interval = config.check_interval,
        warning_threshold = config.warning_threshold,
        "starting periodic check"
    );
    let task = tokio::spawn(monitor.run());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    info!("shutting down");

    // Dropping the last handle closes the command channel and ends the task.
    drop(handle);
    task.await.context("Monitor task panicked")?;
    Ok(())
}
