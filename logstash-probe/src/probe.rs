//! Probe contract and the Logstash implementation
//!
//! A probe answers two questions for the monitoring side:
//! - which items exist on this host (discovery)
//! - what their current values are (metrics)

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::fetch::StatsClient;
use crate::metrics::{FlatMetrics, StatsAssembler};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

/// `{hostname: {discovery_key: [items]}}`
pub type DiscoveryPayload = BTreeMap<String, BTreeMap<String, Vec<Value>>>;

/// `{hostname: {metric_key: value}}`
pub type MetricsPayload = BTreeMap<String, FlatMetrics>;

/// What a probe hands to the sender
#[derive(Debug, Clone, PartialEq)]
pub enum ProbePayload {
    Discovery(DiscoveryPayload),
    Metrics(MetricsPayload),
}

/// The two capabilities the monitoring framework needs from a probe
#[allow(async_fn_in_trait)]
pub trait Probe {
    async fn discovery(&self) -> Result<DiscoveryPayload, ProbeError>;
    async fn metrics(&self) -> Result<MetricsPayload, ProbeError>;
}

/// `localhost` stands for this machine, reported under its real hostname
pub fn resolve_hostname(configured: &str) -> String {
    if configured == "localhost" {
        gethostname::gethostname().to_string_lossy().to_string()
    } else {
        configured.to_string()
    }
}

/// Probe for one Logstash node
pub struct LogstashProbe {
    hostname: String,
    discovery_key: String,
    stats_path: String,
    client: StatsClient,
    assembler: StatsAssembler,
}

impl LogstashProbe {
    pub fn new(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        let client = StatsClient::new(&config.logstash.host, config.logstash.port, config.timeout())?;
        let hostname = resolve_hostname(&config.logstash.host);
        info!("Probing Logstash at {} as host {}", client.url_for(&config.logstash.stats_path), hostname);

        Ok(Self {
            hostname,
            discovery_key: config.zabbix.discovery_key.clone(),
            stats_path: config.logstash.stats_path.clone(),
            client,
            assembler: StatsAssembler::new(),
        })
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

impl Probe for LogstashProbe {
    /// Registers the host with no discovered items
    async fn discovery(&self) -> Result<DiscoveryPayload, ProbeError> {
        let mut items = BTreeMap::new();
        items.insert(self.discovery_key.clone(), Vec::new());

        let mut payload = DiscoveryPayload::new();
        payload.insert(self.hostname.clone(), items);
        Ok(payload)
    }

    async fn metrics(&self) -> Result<MetricsPayload, ProbeError> {
        let stats = self.client.fetch(&self.stats_path).await?;
        let metrics = self.assembler.assemble(&stats)?;
        info!("Collected {} metrics for {}", metrics.len(), self.hostname);

        let mut payload = MetricsPayload::new();
        payload.insert(self.hostname.clone(), metrics);
        Ok(payload)
    }
}
