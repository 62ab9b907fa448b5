//! Hand-off to Zabbix
//!
//! The trapper protocol itself belongs to `zabbix_sender`. The probe writes that
//! tool's input format, one `"<host>" <key> <value>` line per item, so its
//! output can be piped into `zabbix_sender -z <server> -i -`.

use crate::probe::ProbePayload;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::io::Write;
use tracing::debug;

/// Delivers a probe payload and returns the code to exit with
pub trait Sender {
    fn send(&mut self, payload: &ProbePayload) -> Result<i32>;
}

/// Writes `zabbix_sender` input lines to any writer
pub struct ZabbixSenderOutput<W: Write> {
    out: W,
}

impl<W: Write> ZabbixSenderOutput<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_line(&mut self, host: &str, key: &str, value: &str) -> Result<()> {
        writeln!(self.out, "{} {} {}", quote(host), key, value)
            .with_context(|| format!("Failed to write item {}", key))
    }
}

impl<W: Write> Sender for ZabbixSenderOutput<W> {
    fn send(&mut self, payload: &ProbePayload) -> Result<i32> {
        let mut count = 0usize;

        match payload {
            ProbePayload::Discovery(hosts) => {
                for (host, keys) in hosts {
                    for (key, items) in keys {
                        let lld = json!({ "data": items }).to_string();
                        self.write_line(host, key, &quote(&lld))?;
                        count += 1;
                    }
                }
            }
            ProbePayload::Metrics(hosts) => {
                for (host, metrics) in hosts {
                    for (key, value) in metrics {
                        self.write_line(host, key, &render_value(value))?;
                        count += 1;
                    }
                }
            }
        }

        self.out.flush().context("Failed to flush sender output")?;
        debug!("Wrote {} sender lines", count);
        Ok(0)
    }
}

/// Numbers and booleans go bare; everything else is quoted
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => quote(s),
        Value::Null | Value::Array(_) | Value::Object(_) => quote(&value.to_string()),
    }
}

/// Double-quotes `raw`, escaping backslashes and quotes.
/// `zabbix_sender -i` knows no other escapes and reads one item per line, so
/// line breaks become spaces.
fn quote(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' | '\r' => quoted.push(' '),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FlatMetrics;
    use crate::probe::{DiscoveryPayload, MetricsPayload};
    use probe_devkit::RecordingWriter;
    use std::collections::BTreeMap;

    fn metrics_payload(host: &str, entries: &[(&str, Value)]) -> ProbePayload {
        let metrics: FlatMetrics = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let mut payload = MetricsPayload::new();
        payload.insert(host.to_string(), metrics);
        ProbePayload::Metrics(payload)
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!(10)), "10");
        assert_eq!(render_value(&json!(0.61)), "0.61");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&json!("0.0.1")), "\"0.0.1\"");
        assert_eq!(render_value(&json!("say \"hi\"")), r#""say \"hi\"""#);
        assert_eq!(render_value(&json!("C:\\logstash")), r#""C:\\logstash""#);
        assert_eq!(render_value(&Value::Null), "\"null\"");
        assert_eq!(render_value(&json!([])), "\"[]\"");
    }

    #[test]
    fn test_metrics_lines() {
        let recorder = RecordingWriter::new();
        let mut sender = ZabbixSenderOutput::new(recorder.clone());
        let payload = metrics_payload(
            "node-1",
            &[
                ("logstash.pipeline.events.in", json!(10)),
                ("logstash.zbx_version", json!("0.0.1")),
            ],
        );

        assert_eq!(sender.send(&payload).unwrap(), 0);
        assert_eq!(
            recorder.contents(),
            "\"node-1\" logstash.pipeline.events.in 10\n\"node-1\" logstash.zbx_version \"0.0.1\"\n"
        );
    }

    #[test]
    fn test_discovery_lines() {
        let recorder = RecordingWriter::new();
        let mut sender = ZabbixSenderOutput::new(recorder.clone());

        let mut keys = BTreeMap::new();
        keys.insert("logstash.node.discovery".to_string(), Vec::new());
        let mut payload = DiscoveryPayload::new();
        payload.insert("node-1".to_string(), keys);

        assert_eq!(sender.send(&ProbePayload::Discovery(payload)).unwrap(), 0);

        let line = recorder.find("logstash.node.discovery").unwrap();
        assert_eq!(line.host, "node-1");
        assert_eq!(line.value, r#""{\"data\":[]}""#);
    }

    #[test]
    fn test_multiline_string_stays_on_one_line() {
        let recorder = RecordingWriter::new();
        let mut sender = ZabbixSenderOutput::new(recorder.clone());
        sender
            .send(&metrics_payload("node-1", &[("logstash.jvm.last_error", json!("line one\r\nline two"))]))
            .unwrap();

        assert_eq!(recorder.lines().len(), 1);
        assert_eq!(
            recorder.contents(),
            "\"node-1\" logstash.jvm.last_error \"line one  line two\"\n"
        );
    }

    #[test]
    fn test_host_is_quoted() {
        let recorder = RecordingWriter::new();
        let mut sender = ZabbixSenderOutput::new(recorder.clone());
        sender
            .send(&metrics_payload("my host", &[("k", json!(1))]))
            .unwrap();
        assert_eq!(recorder.lines()[0].host, "my host");
    }

    #[test]
    fn test_write_failure_is_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sender = ZabbixSenderOutput::new(Broken);
        assert!(sender.send(&metrics_payload("h", &[("k", json!(1))])).is_err());
    }
}
