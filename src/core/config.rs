use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::core::quota::DailyQuota;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Daily quota settings. Quotas are configured in megabytes; the engine
/// works in bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaSettings {
    /// Quota for Monday through Thursday, in MB
    #[serde(default = "default_workday_mb")]
    pub workday_mb: u64,
    /// Quota for Friday through Sunday, in MB
    #[serde(default = "default_weekend_mb")]
    pub weekend_mb: u64,
    /// Local-time hour (0-23) at which daily usage resets
    #[serde(default)]
    pub reset_hour: u32,
}

fn default_workday_mb() -> u64 {
    500
}
fn default_weekend_mb() -> u64 {
    1000
}

impl Default for QuotaSettings {
    fn default() -> Self {
        Self {
            workday_mb: default_workday_mb(),
            weekend_mb: default_weekend_mb(),
            reset_hour: 0,
        }
    }
}

impl QuotaSettings {
    pub fn daily_quota(&self) -> DailyQuota {
        DailyQuota {
            workday: self.workday_mb * 1024 * 1024,
            weekend: self.weekend_mb * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Subscription endpoint queried with a HEAD request
    pub subscription_url: Option<String>,
    /// Seconds between periodic checks in watch mode
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    /// Overall usage percent at which warnings start firing
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: u32,
    /// Optional webhook receiving warning and daily-report payloads
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub quota: QuotaSettings,
}

fn default_check_interval() -> u64 {
    3600
}
fn default_warning_threshold() -> u32 {
    80
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            subscription_url: None,
            check_interval: default_check_interval(),
            warning_threshold: default_warning_threshold(),
            webhook_url: None,
            quota: QuotaSettings::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("subw").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).expect("Failed to serialize config");
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.check_interval == 0 {
            issues.push("check_interval must be at least 1 second".to_string());
        }
        if self.warning_threshold > 100 {
            issues.push(format!(
                "Invalid warning_threshold: {} (must be 0-100)",
                self.warning_threshold
            ));
        }
        if self.quota.reset_hour > 23 {
            issues.push(format!(
                "Invalid reset_hour: {} (must be 0-23)",
                self.quota.reset_hour
            ));
        }
        if self.quota.workday_mb == 0 || self.quota.weekend_mb == 0 {
            issues.push("Daily quotas must be greater than 0 MB".to_string());
        }
        for (name, url) in [
            ("subscription_url", &self.subscription_url),
            ("webhook_url", &self.webhook_url),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    issues.push(format!("{}: must start with http:// or https://", name));
                }
            }
        }
        issues
    }
}
