//! HTTP access to the Logstash monitoring API

use crate::error::ProbeError;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Default request timeout against the monitoring API
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for one Logstash node's monitoring API
#[derive(Debug, Clone)]
pub struct StatsClient {
    host: String,
    port: u16,
    client: reqwest::Client,
}

impl StatsClient {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("logstash-probe/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            host: host.into(),
            port,
            client,
        })
    }

    /// `http://{host}:{port}{path}`
    pub fn url_for(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.host, self.port, path)
    }

    /// GETs `path` and parses the body as JSON. Any failure is logged once
    /// and returned as `ProbeError::Transport`; there is no retry.
    pub async fn fetch(&self, path: &str) -> Result<Value, ProbeError> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        match self.get_json(&url).await {
            Ok(document) => Ok(document),
            Err(source) => {
                error!("failed to open: {} ({})", path, source);
                Err(ProbeError::Transport {
                    path: path.to_string(),
                    source,
                })
            }
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}
