use serde::{Deserialize, Serialize};

/// Raw counters reported by the subscription endpoint.
///
/// All byte counters are absolute and cumulative; `total` and `expire`
/// use 0 to mean "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Cumulative uploaded bytes
    pub upload: u64,
    /// Cumulative downloaded bytes
    pub download: u64,
    /// Plan ceiling in bytes (0 = unknown/unlimited)
    pub total: u64,
    /// Plan expiry as epoch seconds (0 = unknown)
    pub expire: u64,
}

impl UsageSnapshot {
    pub fn used(&self) -> u64 {
        self.upload + self.download
    }
}

/// A snapshot with overall-usage figures derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    #[serde(flatten)]
    pub snapshot: UsageSnapshot,
    /// upload + download
    pub used: u64,
    /// Rounded used/total percentage; 0 when total is unknown. Not capped.
    pub percent_used: u32,
    /// Whether overall usage has reached the warning threshold
    pub is_warning: bool,
}

impl UsageReport {
    pub fn from_snapshot(snapshot: UsageSnapshot, warning_threshold: u32) -> Self {
        let used = snapshot.used();
        let percent_used = if snapshot.total == 0 {
            0
        } else {
            ((used as f64 / snapshot.total as f64) * 100.0).round() as u32
        };
        Self {
            snapshot,
            used,
            percent_used,
            is_warning: percent_used >= warning_threshold,
        }
    }
}
