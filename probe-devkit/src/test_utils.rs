/*!
Test harness for the Logstash probe

Bundles a mock Logstash node and a recording writer, and turns on logging
for the test binary. The probe logs through `tracing`; its dev build enables
tracing's `log` feature so those events reach the `env_logger` installed here.
*/

use crate::fixtures::StatsFixture;
use crate::mock_logstash::MockLogstash;
use crate::recording::{RecordingWriter, SenderLine};
use anyhow::Result;
use serde_json::Value;

/// Everything a probe test needs around the code under test
pub struct TestHarness {
    pub logstash: MockLogstash,
    pub output: RecordingWriter,
}

impl TestHarness {
    /// Starts the mock node; nothing is served until a stats answer is set
    pub async fn start() -> Self {
        env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .try_init()
            .ok(); // Init logging for tests

        Self {
            logstash: MockLogstash::start().await,
            output: RecordingWriter::new(),
        }
    }

    /// Starts the mock node already serving the full fixture
    pub async fn with_node_stats() -> Self {
        let mut harness = Self::start().await;
        harness.logstash.serve_stats(&StatsFixture::node_stats()).await;
        harness
    }

    pub async fn serve(&mut self, document: &Value) -> &mut Self {
        self.logstash.serve_stats(document).await;
        self
    }

    /// Asserts a line for `key` was emitted with exactly `expected` as value
    pub fn assert_sent(&self, key: &str, expected: &str) -> Result<()> {
        match self.output.find(key) {
            Some(SenderLine { value, .. }) if value == expected => {
                log::info!("✅ {} = {}", key, expected);
                Ok(())
            }
            Some(line) => anyhow::bail!(
                "Value mismatch for '{}': expected {}, got {}",
                key, expected, line.value
            ),
            None => anyhow::bail!("No line emitted for key '{}'", key),
        }
    }

    /// Asserts every emitted line was reported for `host`
    pub fn assert_host(&self, host: &str) -> Result<()> {
        let lines = self.output.lines();
        if lines.is_empty() {
            anyhow::bail!("No lines emitted");
        }
        if let Some(stray) = lines.iter().find(|line| line.host != host) {
            anyhow::bail!("Line for '{}' reported as host '{}', expected '{}'", stray.key, stray.host, host);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_logstash::localhost_binding_permitted;
    use std::io::Write;

    #[tokio::test]
    async fn test_harness_assertions() {
        if !localhost_binding_permitted() {
            return;
        }
        let harness = TestHarness::with_node_stats().await;
        let mut out = harness.output.clone();
        writeln!(out, "\"node\" logstash.pipeline.events.in 10").unwrap();

        harness.assert_sent("logstash.pipeline.events.in", "10").unwrap();
        assert!(harness.assert_sent("logstash.pipeline.events.in", "11").is_err());
        assert!(harness.assert_sent("logstash.missing", "1").is_err());
        harness.assert_host("node").unwrap();
        assert!(harness.assert_host("other").is_err());
    }
}
