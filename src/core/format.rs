use chrono::{DateTime, Local};

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Returns a human-readable byte count like "1.5 KB" or "27 GB".
/// Two decimals at most, trailing zeros trimmed.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exp = (((bytes as f64).ln() / 1024f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    let mut text = format!("{:.2}", value);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{} {}", text, UNITS[exp])
}

/// Returns the plan expiry as a local date string, or "unknown" for 0.
pub fn format_expiry(expire: u64) -> String {
    if expire == 0 {
        return "unknown".to_string();
    }
    match DateTime::from_timestamp(expire as i64, 0) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "unknown".to_string(),
    }
}

/// Returns "[███░░░░░░░░░]" where █ = used portion, ░ = remaining portion.
/// Width is the number of block characters inside the brackets.
pub fn format_usage_bar(percent_used: u32, width: usize) -> String {
    let pct = percent_used.min(100) as f64;
    let used_blocks = ((pct / 100.0) * width as f64).round() as usize;
    let remaining_blocks = width.saturating_sub(used_blocks);

    format!(
        "[{}{}]",
        "█".repeat(used_blocks),
        "░".repeat(remaining_blocks)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_zero() {
        assert_eq!(format_bytes(0), "0 B");
    }

    #[test]
    fn format_bytes_small() {
        assert_eq!(format_bytes(512), "512 B");
    }

    #[test]
    fn format_bytes_trims_trailing_zeros() {
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
    }

    #[test]
    fn format_bytes_two_decimals() {
        // 1.2345 MB rounds to 1.23 MB
        assert_eq!(format_bytes(1_294_468), "1.23 MB");
    }

    #[test]
    fn format_bytes_large_units() {
        assert_eq!(format_bytes(10 * 1024 * 1024 * 1024), "10 GB");
        assert_eq!(format_bytes(2 * 1024u64.pow(4)), "2 TB");
    }

    #[test]
    fn format_expiry_unknown() {
        assert_eq!(format_expiry(0), "unknown");
    }

    #[test]
    fn format_expiry_known() {
        let text = format_expiry(1_700_000_000);
        assert_ne!(text, "unknown");
        assert!(text.starts_with("2023-11-1"));
    }

    #[test]
    fn usage_bar_extremes() {
        assert_eq!(format_usage_bar(0, 12), "[░░░░░░░░░░░░]");
        assert_eq!(format_usage_bar(100, 12), "[████████████]");
        assert_eq!(format_usage_bar(50, 12), "[██████░░░░░░]");
    }

    #[test]
    fn usage_bar_caps_over_hundred() {
        assert_eq!(format_usage_bar(250, 12), "[████████████]");
    }
}
