use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::core::format::format_bytes;
use crate::core::models::analytics::CycleRecord;
use crate::core::subscription::validate_endpoint;

/// Delivery target for warnings and daily reports. Implementations return
/// `false` on any failure instead of raising, so the scheduler can leave the
/// cooldown gate armed and retry next cycle.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_warning(&self, record: &CycleRecord) -> bool;
    async fn send_daily_report(&self, record: &CycleRecord) -> bool;
}

/// Posts notification payloads to a webhook as JSON.
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        validate_endpoint(&url)?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { url, client })
    }

    async fn post(&self, kind: &str, record: &CycleRecord) -> bool {
        let payload = json!({
            "kind": kind,
            "timestamp": record.timestamp,
            "report": record.report,
            "analytics": record.analytics,
        });
        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(
                    kind,
                    status = response.status().as_u16(),
                    "webhook rejected notification"
                );
                false
            }
            Err(e) => {
                warn!(kind, error = %e, "failed to deliver notification");
                false
            }
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send_warning(&self, record: &CycleRecord) -> bool {
        self.post("warning", record).await
    }

    async fn send_daily_report(&self, record: &CycleRecord) -> bool {
        self.post("daily_report", record).await
    }
}

/// Fallback sink used when no webhook is configured: writes the notification
/// to the log and always reports success, so cooldowns still apply.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send_warning(&self, record: &CycleRecord) -> bool {
        info!(
            overall_percent = record.report.percent_used,
            today_used = %format_bytes(record.analytics.today_used),
            today_quota = %format_bytes(record.analytics.today_quota),
            "traffic warning"
        );
        true
    }

    async fn send_daily_report(&self, record: &CycleRecord) -> bool {
        info!(
            used = %format_bytes(record.report.used),
            total = %format_bytes(record.report.snapshot.total),
            remaining = %format_bytes(record.analytics.remaining),
            days_until_expire = record.analytics.days_until_expire,
            quota_sufficient = record.analytics.is_quota_sufficient,
            "daily traffic report"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::analytics::QuotaAnalytics;
    use crate::core::models::usage::{UsageReport, UsageSnapshot};
    use chrono::Local;

    fn record() -> CycleRecord {
        let snapshot = UsageSnapshot {
            upload: 100,
            download: 200,
            total: 1000,
            expire: 0,
        };
        CycleRecord {
            timestamp: Local::now(),
            report: UsageReport::from_snapshot(snapshot, 80),
            analytics: QuotaAnalytics {
                today_used: 300,
                today_quota: 500,
                today_percent_used: 60,
                is_weekend: false,
                days_until_expire: 0,
                remaining: 700,
                daily_allowance: 0,
                is_quota_sufficient: true,
                over_quota: false,
            },
        }
    }

    #[test]
    fn webhook_sink_rejects_bad_url() {
        assert!(WebhookSink::new("not-a-url").is_err());
        assert!(WebhookSink::new("https://hooks.example.com/notify").is_ok());
    }

    #[tokio::test]
    async fn log_sink_always_succeeds() {
        let sink = LogSink;
        assert!(sink.send_warning(&record()).await);
        assert!(sink.send_daily_report(&record()).await);
    }

    #[tokio::test]
    async fn webhook_sink_returns_false_on_unreachable_endpoint() {
        // Reserved TEST-NET-1 address; nothing listens there.
        let sink = WebhookSink::new("http://192.0.2.1:9/hook").unwrap();
        assert!(!sink.send_warning(&record()).await);
    }
}
