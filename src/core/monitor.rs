use std::collections::VecDeque;

use chrono::{DateTime, Duration, Local};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::core::config::AppConfig;
use crate::core::format::format_bytes;
use crate::core::models::analytics::CycleRecord;
use crate::core::models::usage::UsageReport;
use crate::core::notify::NotificationSink;
use crate::core::quota::{self, DailyQuota};
use crate::core::scheduler::{NotificationKind, NotificationScheduler};
use crate::core::subscription::SnapshotProvider;
use crate::core::tracker::DailyUsageTracker;

/// At most this many cycle records are kept; the oldest is evicted first.
const HISTORY_LIMIT: usize = 30;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to fetch subscription snapshot: {0}")]
    Fetch(#[source] anyhow::Error),
    #[error("Monitor task is no longer running")]
    Stopped,
}

/// The subset of [`AppConfig`] the monitor acts on.
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    /// Seconds between periodic cycles; also the staleness bound for
    /// on-demand reads
    pub check_interval: u64,
    pub warning_threshold: u32,
    pub quota: DailyQuota,
    pub reset_hour: u32,
}

impl From<&AppConfig> for MonitorConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            check_interval: config.check_interval,
            warning_threshold: config.warning_threshold,
            quota: config.quota.daily_quota(),
            reset_hour: config.quota.reset_hour,
        }
    }
}

enum Command {
    Latest(oneshot::Sender<Result<CycleRecord, MonitorError>>),
    History(oneshot::Sender<Vec<CycleRecord>>),
    ForceUpdate(oneshot::Sender<Result<CycleRecord, MonitorError>>),
}

/// Query handle to a running monitor task. Cloneable; all queries are
/// answered by the single owning task, so an on-demand read can never race a
/// second cycle into flight.
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<Command>,
}

impl MonitorHandle {
    /// The most recent cycle record, refreshed first if it is older than the
    /// check interval.
    pub async fn latest(&self) -> Result<CycleRecord, MonitorError> {
        self.query(Command::Latest).await?
    }

    /// Recorded cycles, oldest first.
    pub async fn history(&self) -> Result<Vec<CycleRecord>, MonitorError> {
        self.query(Command::History).await
    }

    /// Run a fresh cycle immediately regardless of staleness.
    pub async fn force_update(&self) -> Result<CycleRecord, MonitorError> {
        self.query(Command::ForceUpdate).await?
    }

    async fn query<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, MonitorError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(make(tx))
            .await
            .map_err(|_| MonitorError::Stopped)?;
        rx.await.map_err(|_| MonitorError::Stopped)
    }
}

/// Owns all mutable analytics state and runs one cycle at a time: fetch a
/// snapshot, fold it into the daily tracker, forecast the quota, let the
/// scheduler dispatch notifications, then record the result.
pub struct Monitor {
    provider: Box<dyn SnapshotProvider>,
    sink: Box<dyn NotificationSink>,
    config: MonitorConfig,
    tracker: DailyUsageTracker,
    scheduler: NotificationScheduler,
    history: VecDeque<CycleRecord>,
    latest: Option<CycleRecord>,
    last_update: Option<DateTime<Local>>,
    rx: Option<mpsc::Receiver<Command>>,
}

impl Monitor {
    pub fn new(
        provider: Box<dyn SnapshotProvider>,
        sink: Box<dyn NotificationSink>,
        config: MonitorConfig,
    ) -> (Self, MonitorHandle) {
        let (tx, rx) = mpsc::channel(16);
        let monitor = Self {
            provider,
            sink,
            tracker: DailyUsageTracker::new(config.reset_hour),
            scheduler: NotificationScheduler::new(),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            latest: None,
            last_update: None,
            config,
            rx: Some(rx),
        };
        (monitor, MonitorHandle { tx })
    }

    /// Drive periodic cycles and answer queries until every handle is gone.
    /// The first cycle runs immediately.
    pub async fn run(mut self) {
        // The receiver leaves `self` so the select arms below can borrow
        // `self` mutably while the recv future is pending.
        let Some(mut rx) = self.rx.take() else {
            return;
        };
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(self.config.check_interval));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!(error = %e, "periodic cycle failed");
                    }
                }
                cmd = rx.recv() => match cmd {
                    Some(Command::Latest(reply)) => {
                        let _ = reply.send(self.latest_or_refresh().await);
                    }
                    Some(Command::History(reply)) => {
                        let _ = reply.send(self.history.iter().cloned().collect());
                    }
                    Some(Command::ForceUpdate(reply)) => {
                        let _ = reply.send(self.run_cycle().await);
                    }
                    None => break,
                },
            }
        }
    }

    /// Execute one full analytics cycle.
    ///
    /// A fetch failure aborts the cycle before any state is touched. A
    /// notification failure does not: it is logged, the gate stays armed,
    /// and the record is still stored.
    pub async fn run_cycle(&mut self) -> Result<CycleRecord, MonitorError> {
        let snapshot = self.provider.fetch().await.map_err(MonitorError::Fetch)?;
        let now = Local::now();

        let day = self.tracker.update(snapshot.upload, snapshot.download, now);
        let report = UsageReport::from_snapshot(snapshot, self.config.warning_threshold);
        let analytics = quota::analyze(&snapshot, &day, now, &self.config.quota);
        let record = CycleRecord {
            timestamp: now,
            report,
            analytics,
        };

        info!(
            used = %format_bytes(report.used),
            total = %format_bytes(snapshot.total),
            overall_percent = report.percent_used,
            today_used = %format_bytes(analytics.today_used),
            today_quota = %format_bytes(analytics.today_quota),
            today_percent = analytics.today_percent_used,
            "subscription data updated"
        );

        for kind in self.scheduler.due(
            &analytics,
            report.percent_used,
            self.config.warning_threshold,
            now,
        ) {
            let sent = match kind {
                NotificationKind::Warning => self.sink.send_warning(&record).await,
                NotificationKind::DailyReport => self.sink.send_daily_report(&record).await,
            };
            if sent {
                self.scheduler.mark_sent(kind, now);
                info!(?kind, "notification dispatched");
            } else {
                error!(?kind, "notification dispatch failed; will retry next cycle");
            }
        }

        self.history.push_back(record.clone());
        if self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.latest = Some(record.clone());
        self.last_update = Some(now);
        Ok(record)
    }

    async fn latest_or_refresh(&mut self) -> Result<CycleRecord, MonitorError> {
        let stale = self
            .last_update
            .map_or(true, |at| {
                Local::now() - at > Duration::seconds(self.config.check_interval as i64)
            });
        match (&self.latest, stale) {
            (Some(record), false) => Ok(record.clone()),
            _ => self.run_cycle().await,
        }
    }
}
