use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

/// Accumulated usage for the current day window, as returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayUsage {
    pub date: NaiveDate,
    /// Bytes uploaded since the last daily reset
    pub upload: u64,
    /// Bytes downloaded since the last daily reset
    pub download: u64,
}

impl DayUsage {
    pub fn used(&self) -> u64 {
        self.upload + self.download
    }
}

#[derive(Debug, Clone)]
struct Window {
    date: NaiveDate,
    upload: u64,
    download: u64,
    last_upload: u64,
    last_download: u64,
    next_reset: NaiveDateTime,
}

#[derive(Debug, Clone)]
enum State {
    Uninitialized,
    Tracking(Window),
}

/// Turns absolute cumulative upload/download counters into "usage since the
/// last daily reset".
///
/// The tracker holds one day window at a time. A window closes when the
/// calendar day changes or the configured reset hour passes; the cycle that
/// closes a window seeds the observed counters and contributes no delta.
/// Deltas are clamped at zero: a counter that went backwards (provider-side
/// rollover) is logged and treated as no traffic rather than subtracted.
pub struct DailyUsageTracker {
    reset_hour: u32,
    state: State,
}

impl DailyUsageTracker {
    pub fn new(reset_hour: u32) -> Self {
        Self {
            reset_hour: reset_hour.min(23),
            state: State::Uninitialized,
        }
    }

    /// Fold one pair of absolute counters into the current day window.
    pub fn update(&mut self, upload: u64, download: u64, now: DateTime<Local>) -> DayUsage {
        let local = now.naive_local();
        match &mut self.state {
            State::Tracking(w) if w.date == local.date() && local < w.next_reset => {
                if upload < w.last_upload || download < w.last_download {
                    warn!(
                        upload,
                        last_upload = w.last_upload,
                        download,
                        last_download = w.last_download,
                        "observed counters went backwards; treating delta as zero"
                    );
                }
                w.upload += upload.saturating_sub(w.last_upload);
                w.download += download.saturating_sub(w.last_download);
                w.last_upload = upload;
                w.last_download = download;
                DayUsage {
                    date: w.date,
                    upload: w.upload,
                    download: w.download,
                }
            }
            _ => self.reset(upload, download, local),
        }
    }

    /// Open a fresh day window: accumulators zeroed, observed counters seeded
    /// to the triggering snapshot, next reset at the next occurrence of the
    /// reset hour strictly after `now`.
    fn reset(&mut self, upload: u64, download: u64, now: NaiveDateTime) -> DayUsage {
        let next_reset = next_reset_after(now, self.reset_hour);
        debug!(%next_reset, "daily usage window reset");
        let window = Window {
            date: now.date(),
            upload: 0,
            download: 0,
            last_upload: upload,
            last_download: download,
            next_reset,
        };
        let usage = DayUsage {
            date: window.date,
            upload: 0,
            download: 0,
        };
        self.state = State::Tracking(window);
        usage
    }
}

fn next_reset_after(now: NaiveDateTime, reset_hour: u32) -> NaiveDateTime {
    let today_reset = now
        .date()
        .and_hms_opt(reset_hour, 0, 0)
        .expect("reset hour is clamped to 0-23");
    if now < today_reset {
        today_reset
    } else {
        today_reset + Duration::days(1)
    }
}
