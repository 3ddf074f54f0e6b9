use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Weekday};

use crate::core::models::analytics::QuotaAnalytics;
use crate::core::models::usage::UsageSnapshot;
use crate::core::tracker::DayUsage;

/// Per-day quotas in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyQuota {
    /// Monday through Thursday
    pub workday: u64,
    /// Friday through Sunday
    pub weekend: u64,
}

/// Whether a day gets the weekend quota. Friday, Saturday and Sunday all
/// count as weekend here — the plan's pricing model, not the calendar's.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(
        date.weekday(),
        Weekday::Fri | Weekday::Sat | Weekday::Sun
    )
}

pub fn quota_for(date: NaiveDate, quota: &DailyQuota) -> u64 {
    if is_weekend(date) {
        quota.weekend
    } else {
        quota.workday
    }
}

/// Whole days from `now` until the expiry timestamp, floored at zero.
/// Unknown expiry (0) counts as already expired.
pub fn days_until_expire(expire: u64, now: DateTime<Local>) -> u32 {
    if expire == 0 {
        return 0;
    }
    let seconds = expire as i64 - now.timestamp();
    if seconds <= 0 {
        0
    } else {
        (seconds / 86_400) as u32
    }
}

/// Total bytes the daily quotas grant over `days` calendar days starting at
/// `start`, classifying each day as workday or weekend.
pub fn required_until_expire(start: NaiveDate, days: u32, quota: &DailyQuota) -> u64 {
    (0..days)
        .map(|i| quota_for(start + Duration::days(i as i64), quota))
        .sum()
}

/// Derive the full quota analytics for one cycle. Pure: mutates nothing.
pub fn analyze(
    snapshot: &UsageSnapshot,
    day: &DayUsage,
    now: DateTime<Local>,
    quota: &DailyQuota,
) -> QuotaAnalytics {
    let today = now.date_naive();
    let today_used = day.used();
    let today_quota = quota_for(today, quota);
    let today_percent_used = if today_quota == 0 {
        0
    } else {
        (((today_used as f64 / today_quota as f64) * 100.0).round() as u32).min(100)
    };

    let days = days_until_expire(snapshot.expire, now);
    let remaining = snapshot.total.saturating_sub(snapshot.used());
    let daily_allowance = if days > 0 { remaining / days as u64 } else { 0 };
    let is_quota_sufficient =
        days == 0 || remaining >= required_until_expire(today, days, quota);

    QuotaAnalytics {
        today_used,
        today_quota,
        today_percent_used,
        is_weekend: is_weekend(today),
        days_until_expire: days,
        remaining,
        daily_allowance,
        is_quota_sufficient,
        over_quota: today_used > today_quota,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MB: u64 = 1024 * 1024;

    fn quota() -> DailyQuota {
        DailyQuota {
            workday: 500 * MB,
            weekend: 1000 * MB,
        }
    }

    fn day(date: NaiveDate, upload: u64, download: u64) -> DayUsage {
        DayUsage {
            date,
            upload,
            download,
        }
    }

    // 2025-06-02 is a Monday.
    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn weekend_is_friday_through_sunday() {
        assert!(!is_weekend(june(2))); // Mon
        assert!(!is_weekend(june(3))); // Tue
        assert!(!is_weekend(june(4))); // Wed
        assert!(!is_weekend(june(5))); // Thu
        assert!(is_weekend(june(6))); // Fri
        assert!(is_weekend(june(7))); // Sat
        assert!(is_weekend(june(8))); // Sun
    }

    #[test]
    fn quota_for_picks_the_right_rate() {
        assert_eq!(quota_for(june(5), &quota()), 500 * MB);
        assert_eq!(quota_for(june(6), &quota()), 1000 * MB);
    }

    #[test]
    fn days_until_expire_floors() {
        let now = Local.with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap();
        let expire = (now.timestamp() + 10 * 86_400) as u64;
        assert_eq!(days_until_expire(expire, now), 10);
        // 9.5 days floors to 9
        let expire = (now.timestamp() + 9 * 86_400 + 43_200) as u64;
        assert_eq!(days_until_expire(expire, now), 9);
    }

    #[test]
    fn days_until_expire_handles_past_and_unknown() {
        let now = Local.with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap();
        assert_eq!(days_until_expire(0, now), 0);
        assert_eq!(days_until_expire((now.timestamp() - 100) as u64, now), 0);
    }

    #[test]
    fn required_spans_workdays_and_weekends() {
        // Thu, Fri, Sat: one workday + two weekend days
        let needed = required_until_expire(june(5), 3, &quota());
        assert_eq!(needed, 500 * MB + 2 * 1000 * MB);
    }

    #[test]
    fn sufficiency_threshold_is_exact() {
        let now = Local.with_ymd_and_hms(2025, 6, 5, 8, 0, 0).unwrap(); // Thursday
        let needed = 500 * MB + 2 * 1000 * MB;
        let expire = (now.timestamp() + 3 * 86_400) as u64;
        let usage = day(june(5), 0, 0);

        let snap = UsageSnapshot {
            upload: 0,
            download: 0,
            total: needed,
            expire,
        };
        assert!(analyze(&snap, &usage, now, &quota()).is_quota_sufficient);

        let snap = UsageSnapshot {
            upload: 1,
            download: 0,
            total: needed,
            expire,
        };
        assert!(!analyze(&snap, &usage, now, &quota()).is_quota_sufficient);
    }

    #[test]
    fn expired_plan_is_always_sufficient() {
        let now = Local.with_ymd_and_hms(2025, 6, 5, 8, 0, 0).unwrap();
        let snap = UsageSnapshot {
            upload: 900 * MB,
            download: 0,
            total: 1000 * MB,
            expire: 0,
        };
        let analytics = analyze(&snap, &day(june(5), 0, 0), now, &quota());
        assert!(analytics.is_quota_sufficient);
        assert_eq!(analytics.days_until_expire, 0);
        assert_eq!(analytics.daily_allowance, 0);
    }

    #[test]
    fn today_percent_is_capped_at_one_hundred() {
        let now = Local.with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap();
        let snap = UsageSnapshot {
            upload: 0,
            download: 0,
            total: 0,
            expire: 0,
        };
        let usage = day(june(4), 600 * MB, 600 * MB); // 1200 MB vs 500 MB quota
        let analytics = analyze(&snap, &usage, now, &quota());
        assert_eq!(analytics.today_percent_used, 100);
        assert!(analytics.over_quota);
    }

    #[test]
    fn wednesday_reference_scenario() {
        // 500 MB workday / 1000 MB weekend quotas; 100 MB up + 50 MB down
        // today; 10 GB plan expiring in 10 days, observed on a Wednesday.
        let now = Local.with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap();
        let snap = UsageSnapshot {
            upload: 100 * MB,
            download: 50 * MB,
            total: 10 * 1024 * MB,
            expire: (now.timestamp() + 10 * 86_400) as u64,
        };
        let usage = day(june(4), 100 * MB, 50 * MB);
        let analytics = analyze(&snap, &usage, now, &quota());

        assert_eq!(analytics.today_used, 150 * MB);
        assert_eq!(analytics.today_quota, 500 * MB);
        assert_eq!(analytics.today_percent_used, 30);
        assert!(!analytics.is_weekend);
        assert!(!analytics.over_quota);
        assert_eq!(analytics.days_until_expire, 10);
        assert_eq!(analytics.remaining, 10 * 1024 * MB - 150 * MB);
        assert_eq!(analytics.daily_allowance, (10 * 1024 * MB - 150 * MB) / 10);
    }
}
