use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::core::models::usage::UsageSnapshot;

/// Response header carrying the usage counters, e.g.
/// `upload=455727941; download=6174315083; total=268435456000; expire=1862111733`.
const USERINFO_HEADER: &str = "subscription-userinfo";

/// Source of usage snapshots. The monitor only ever sees this trait, so
/// tests can script snapshots without a network.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn fetch(&self) -> Result<UsageSnapshot>;
}

/// Reject URLs that are not plain HTTP(S) before any request is sent.
pub fn validate_endpoint(url: &str) -> Result<()> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        anyhow::bail!("Subscription URL must use http or https, got: {}", url);
    }
    Ok(())
}

/// Parse a `subscription-userinfo` header value. Unknown keys are ignored
/// and missing or malformed values default to 0.
pub fn parse_userinfo_header(value: &str) -> UsageSnapshot {
    let mut snapshot = UsageSnapshot {
        upload: 0,
        download: 0,
        total: 0,
        expire: 0,
    };
    for part in value.split(';') {
        let Some((key, raw)) = part.split_once('=') else {
            continue;
        };
        let Ok(parsed) = raw.trim().parse::<u64>() else {
            continue;
        };
        match key.trim() {
            "upload" => snapshot.upload = parsed,
            "download" => snapshot.download = parsed,
            "total" => snapshot.total = parsed,
            "expire" => snapshot.expire = parsed,
            _ => {}
        }
    }
    snapshot
}

/// Fetches usage counters from the subscription endpoint with a HEAD
/// request, never downloading the profile body itself.
pub struct SubscriptionClient {
    url: String,
    client: reqwest::Client,
}

impl SubscriptionClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        validate_endpoint(&url)?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl SnapshotProvider for SubscriptionClient {
    async fn fetch(&self) -> Result<UsageSnapshot> {
        let response = self
            .client
            .head(&self.url)
            .send()
            .await
            .context("Failed to reach subscription endpoint")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!(
                "Subscription endpoint returned HTTP {}",
                status.as_u16()
            );
        }

        let header = response
            .headers()
            .get(USERINFO_HEADER)
            .with_context(|| format!("Response has no {} header", USERINFO_HEADER))?;
        let value = header
            .to_str()
            .with_context(|| format!("{} header is not valid UTF-8", USERINFO_HEADER))?;

        Ok(parse_userinfo_header(value))
    }
}
