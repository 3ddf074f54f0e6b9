use chrono::{DateTime, Duration, Local};

use crate::core::models::analytics::QuotaAnalytics;

const WARNING_COOLDOWN_HOURS: i64 = 6;
const REPORT_COOLDOWN_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Warning,
    DailyReport,
}

/// Cooldown latches deciding when warning and daily-report notifications may
/// fire.
///
/// The warning gate opens when overall usage reaches the threshold or today's
/// quota is exceeded; both triggers share one 6-hour cooldown. The
/// daily-report gate opens unconditionally every 24 hours. A latch only
/// advances via [`mark_sent`](Self::mark_sent), so a failed dispatch leaves
/// it armed and the next cycle retries.
#[derive(Debug, Default)]
pub struct NotificationScheduler {
    last_warning: Option<DateTime<Local>>,
    last_report: Option<DateTime<Local>>,
}

impl NotificationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Which notifications may fire this cycle, warning first.
    pub fn due(
        &self,
        analytics: &QuotaAnalytics,
        overall_percent: u32,
        warning_threshold: u32,
        now: DateTime<Local>,
    ) -> Vec<NotificationKind> {
        let mut due = Vec::new();

        let triggered = overall_percent >= warning_threshold || analytics.over_quota;
        if triggered && cooled_down(self.last_warning, WARNING_COOLDOWN_HOURS, now) {
            due.push(NotificationKind::Warning);
        }

        if cooled_down(self.last_report, REPORT_COOLDOWN_HOURS, now) {
            due.push(NotificationKind::DailyReport);
        }

        due
    }

    /// Record a confirmed successful dispatch, starting that kind's cooldown.
    pub fn mark_sent(&mut self, kind: NotificationKind, now: DateTime<Local>) {
        match kind {
            NotificationKind::Warning => self.last_warning = Some(now),
            NotificationKind::DailyReport => self.last_report = Some(now),
        }
    }
}

fn cooled_down(last: Option<DateTime<Local>>, hours: i64, now: DateTime<Local>) -> bool {
    match last {
        None => true,
        Some(at) => now - at > Duration::hours(hours),
    }
}
