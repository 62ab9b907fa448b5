/*!
Mock Logstash node for development without a running Logstash

Serves canned `/_node/stats/` answers from a local HTTP server so the probe
can be exercised end to end: healthy documents, HTTP errors and garbage bodies.
*/

use mockito::{Mock, Server, ServerGuard};
use serde_json::Value;
use std::net::TcpListener;

/// Path the probe polls on a Logstash node
pub const STATS_PATH: &str = "/_node/stats/";

/// Local HTTP server impersonating a Logstash monitoring API
pub struct MockLogstash {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl MockLogstash {
    pub async fn start() -> Self {
        let server = Server::new_async().await;
        log::info!("🧪 [MOCK] Logstash listening on {}", server.host_with_port());
        Self {
            server,
            mocks: Vec::new(),
        }
    }

    /// Host part of the listening address (an IP literal, never `localhost`)
    pub fn host(&self) -> String {
        self.server.socket_address().ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.server.socket_address().port()
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Answers the stats path with `document` and a 200
    pub async fn serve_stats(&mut self, document: &Value) -> &mut Self {
        let body = document.to_string();
        self.serve_raw(200, &body).await
    }

    /// Answers the stats path with an arbitrary status and body
    pub async fn serve_raw(&mut self, status: usize, body: &str) -> &mut Self {
        let mock = self
            .server
            .mock("GET", STATS_PATH)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        log::info!("📦 [MOCK] {} -> {} ({} bytes)", STATS_PATH, status, body.len());
        self.mocks.push(mock);
        self
    }

    /// Answers the stats path with `status` and an error body
    pub async fn fail_with(&mut self, status: usize) -> &mut Self {
        let body = format!(r#"{{"error":"mock failure","status":{}}}"#, status);
        self.serve_raw(status, &body).await
    }

    /// Whether the most recent canned answer was requested at least once
    pub fn was_polled(&self) -> bool {
        self.mocks.last().map(|mock| mock.matched()).unwrap_or(false)
    }
}

/// Some sandboxes forbid binding even on loopback; tests skip themselves there
pub fn localhost_binding_permitted() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

/// A loopback port nothing listens on, for connection-refused scenarios
pub fn refused_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_serves_stats_document() {
        if !localhost_binding_permitted() {
            return;
        }
        let mut logstash = MockLogstash::start().await;
        logstash.serve_stats(&json!({"jvm": {}})).await;

        assert!(!logstash.was_polled());
        assert_eq!(logstash.url(), format!("http://{}:{}", logstash.host(), logstash.port()));
    }

    #[test]
    fn test_refused_port_is_released() {
        if !localhost_binding_permitted() {
            return;
        }
        let port = refused_port();
        assert_ne!(port, 0);
        assert!(std::net::TcpStream::connect(("127.0.0.1", port)).is_err());
    }
}
