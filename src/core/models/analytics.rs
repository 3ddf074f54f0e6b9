use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::models::usage::UsageReport;

/// Daily-quota analytics derived from one snapshot. Computed fresh every
/// cycle; never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaAnalytics {
    /// Bytes consumed since the last daily reset
    pub today_used: u64,
    /// Today's quota in bytes (workday or weekend)
    pub today_quota: u64,
    /// Rounded today_used/today_quota percentage, capped at 100
    pub today_percent_used: u32,
    pub is_weekend: bool,
    /// Whole days until plan expiry (0 if expired or unknown)
    pub days_until_expire: u32,
    /// Bytes left on the plan
    pub remaining: u64,
    /// remaining / days_until_expire (0 if expired or unknown)
    pub daily_allowance: u64,
    /// Whether the remaining bytes cover every day's quota until expiry
    pub is_quota_sufficient: bool,
    /// Whether today's usage already exceeds today's quota
    pub over_quota: bool,
}

/// One completed analytics cycle: when it ran, what the endpoint reported,
/// and what the forecaster made of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub timestamp: DateTime<Local>,
    pub report: UsageReport,
    pub analytics: QuotaAnalytics,
}
