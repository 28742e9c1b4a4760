//! Gateway configuration
//!
//! Defaults match the original deployment (port 8080, thresholds 100/50/10/1).
//! Each field can be overridden through a `MATCHMAKER_*` environment variable.

use anyhow::{Context, ensure};
use matching_engine::RegistryConfig;
use std::net::SocketAddr;
use std::time::Duration;
use types::bucket::BucketTable;

pub const BIND_ADDR_VAR: &str = "MATCHMAKER_BIND_ADDR";
pub const DELIVERY_TIMEOUT_VAR: &str = "MATCHMAKER_DELIVERY_TIMEOUT_MS";
pub const OUTBOUND_CAPACITY_VAR: &str = "MATCHMAKER_OUTBOUND_CAPACITY";
pub const BUCKETS_VAR: &str = "MATCHMAKER_BUCKETS";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// How long a match notification may wait on a slow client.
    pub delivery_timeout: Duration,
    /// Outbound frames buffered per connection.
    pub outbound_capacity: usize,
    pub buckets: BucketTable,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            delivery_timeout: RegistryConfig::default().delivery_timeout,
            outbound_capacity: 32,
            buckets: BucketTable::default(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from defaults plus whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("{BIND_ADDR_VAR}: invalid socket address {addr:?}"))?;
        }

        if let Some(ms) = lookup(DELIVERY_TIMEOUT_VAR) {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("{DELIVERY_TIMEOUT_VAR}: invalid milliseconds {ms:?}"))?;
            config.delivery_timeout = Duration::from_millis(ms);
        }

        if let Some(capacity) = lookup(OUTBOUND_CAPACITY_VAR) {
            config.outbound_capacity = capacity
                .parse()
                .with_context(|| format!("{OUTBOUND_CAPACITY_VAR}: invalid capacity {capacity:?}"))?;
        }
        ensure!(
            config.outbound_capacity > 0,
            "{OUTBOUND_CAPACITY_VAR} must be at least 1"
        );

        if let Some(spec) = lookup(BUCKETS_VAR) {
            config.buckets = parse_buckets(&spec).with_context(|| format!("{BUCKETS_VAR}: {spec:?}"))?;
        }

        Ok(config)
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            delivery_timeout: self.delivery_timeout,
        }
    }
}

/// Parse `100,50,10,1` or `100=high,10=mid,0=low`.
///
/// A bare threshold is its own label.
fn parse_buckets(spec: &str) -> anyhow::Result<BucketTable> {
    let mut entries = Vec::new();
    for item in spec.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let (threshold, label) = match item.split_once('=') {
            Some((threshold, label)) => (threshold.trim(), label.trim()),
            None => (item, item),
        };
        let threshold: i64 = threshold
            .parse()
            .with_context(|| format!("invalid threshold {threshold:?}"))?;
        ensure!(!label.is_empty(), "empty label for threshold {threshold}");
        entries.push((threshold, label.to_string()));
    }

    Ok(BucketTable::new(entries)?)
}
