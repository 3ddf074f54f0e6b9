use anyhow::Result;
use chrono::Local;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::AppConfig;
use crate::core::models::analytics::CycleRecord;
use crate::core::models::usage::UsageReport;
use crate::core::quota;
use crate::core::subscription::{SnapshotProvider, SubscriptionClient};
use crate::core::tracker::DailyUsageTracker;

/// One-shot fetch and analysis. Stateless across invocations: the daily
/// tracker starts cold, so today's counters begin at zero. Use `watch` for
/// continuous delta tracking.
pub async fn run(url: Option<String>, opts: &OutputOptions) -> Result<()> {
    let config = AppConfig::load().unwrap_or_default();
    let Some(url) = url.or_else(|| config.subscription_url.clone()) else {
        eprintln!("No subscription URL configured. Pass --url or run `subw config init`.");
        std::process::exit(1);
    };

    let client = SubscriptionClient::new(url)?;
    let snapshot = client.fetch().await?;
    let now = Local::now();

    let mut tracker = DailyUsageTracker::new(config.quota.reset_hour);
    let day = tracker.update(snapshot.upload, snapshot.download, now);
    let record = CycleRecord {
        timestamp: now,
        report: UsageReport::from_snapshot(snapshot, config.warning_threshold),
        analytics: quota::analyze(&snapshot, &day, now, &config.quota.daily_quota()),
    };

    match opts.format {
        OutputFormat::Json => {
            let json = if opts.pretty {
                serde_json::to_string_pretty(&record)?
            } else {
                serde_json::to_string(&record)?
            };
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("{}", renderer::render_record(&record, opts.use_color));
        }
    }

    Ok(())
}
