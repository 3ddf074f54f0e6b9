use colored::{control, Colorize};

use crate::core::format::{format_bytes, format_expiry, format_usage_bar};
use crate::core::models::analytics::CycleRecord;

const BAR_WIDTH: usize = 12;

/// Render one cycle record as a colored (or plain) block.
///
/// Layout:
/// ```text
///  Subscription
///   Overall    45% used [█████░░░░░░░]
///              12.08 GB / 27 GB
///   Today      30% used [████░░░░░░░░]
///              150 MB / 500 MB (workday quota)
///   Expiry     2026-09-08 10:00 (10 days left)
///   Allowance  1.48 GB/day
///   Forecast   quota sufficient until expiry
/// ```
pub fn render_record(record: &CycleRecord, use_color: bool) -> String {
    control::set_override(use_color);

    let report = &record.report;
    let analytics = &record.analytics;
    let mut lines: Vec<String> = Vec::new();

    lines.push(" Subscription".bold().to_string());

    let overall_pct = format!("{}% used", report.percent_used);
    let overall_pct = if report.is_warning {
        overall_pct.as_str().red().bold().to_string()
    } else {
        overall_pct
    };
    lines.push(format!(
        "  {}    {} {}",
        "Overall".cyan(),
        overall_pct,
        format_usage_bar(report.percent_used, BAR_WIDTH)
    ));
    lines.push(format!(
        "             {} / {}",
        format_bytes(report.used),
        format_bytes(report.snapshot.total)
    ));

    let today_pct = format!("{}% used", analytics.today_percent_used);
    let today_pct = if analytics.over_quota {
        today_pct.as_str().red().bold().to_string()
    } else {
        today_pct
    };
    let quota_label = if analytics.is_weekend {
        "weekend quota"
    } else {
        "workday quota"
    };
    lines.push(format!(
        "  {}      {} {}",
        "Today".cyan(),
        today_pct,
        format_usage_bar(analytics.today_percent_used, BAR_WIDTH)
    ));
    lines.push(format!(
        "             {} / {} ({})",
        format_bytes(analytics.today_used),
        format_bytes(analytics.today_quota),
        quota_label
    ));

    lines.push(format!(
        "  {}     {} ({} days left)",
        "Expiry".cyan(),
        format_expiry(report.snapshot.expire),
        analytics.days_until_expire
    ));

    if analytics.days_until_expire > 0 {
        lines.push(format!(
            "  {}  {}/day",
            "Allowance".cyan(),
            format_bytes(analytics.daily_allowance)
        ));
    }

    let forecast = if analytics.is_quota_sufficient {
        "quota sufficient until expiry".green().to_string()
    } else {
        "quota will not last until expiry".red().bold().to_string()
    };
    lines.push(format!("  {}   {}", "Forecast".cyan(), forecast));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::analytics::QuotaAnalytics;
    use crate::core::models::usage::{UsageReport, UsageSnapshot};
    use chrono::Local;

    const MB: u64 = 1024 * 1024;

    fn record(percent_used_today: u32, sufficient: bool) -> CycleRecord {
        let snapshot = UsageSnapshot {
            upload: 100 * MB,
            download: 50 * MB,
            total: 10 * 1024 * MB,
            expire: 1_862_111_733,
        };
        CycleRecord {
            timestamp: Local::now(),
            report: UsageReport::from_snapshot(snapshot, 80),
            analytics: QuotaAnalytics {
                today_used: 150 * MB,
                today_quota: 500 * MB,
                today_percent_used: percent_used_today,
                is_weekend: false,
                days_until_expire: 10,
                remaining: 10 * 1024 * MB - 150 * MB,
                daily_allowance: 1022 * MB,
                is_quota_sufficient: sufficient,
                over_quota: false,
            },
        }
    }

    #[test]
    fn renders_all_sections_plain() {
        let text = render_record(&record(30, true), false);
        assert!(text.contains("Subscription"));
        assert!(text.contains("Overall"));
        assert!(text.contains("Today"));
        assert!(text.contains("30% used"));
        assert!(text.contains("150 MB / 500 MB (workday quota)"));
        assert!(text.contains("10 days left"));
        assert!(text.contains("quota sufficient until expiry"));
    }

    #[test]
    fn renders_insufficient_forecast() {
        let text = render_record(&record(30, false), false);
        assert!(text.contains("quota will not last until expiry"));
    }

    #[test]
    fn plain_output_has_no_ansi_codes() {
        let text = render_record(&record(30, true), false);
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn omits_allowance_when_expired() {
        let mut rec = record(30, true);
        rec.analytics.days_until_expire = 0;
        let text = render_record(&rec, false);
        assert!(!text.contains("Allowance"));
    }
}
