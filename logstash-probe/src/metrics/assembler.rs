//! Stats assembly: the three sections of `/_node/stats/` reported to Zabbix

use super::{flatten, kind_of, FlatMetrics, KeyTemplate};
use crate::error::ProbeError;
use serde_json::Value;
use tracing::{debug, warn};

/// Static probe version, reported as `logstash.zbx_version`
pub const PROBE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const VERSION_KEY: &str = "logstash.zbx_version";

/// Section path in the stats document → key template
const SECTIONS: &[(&[&str], &str)] = &[
    (&["jvm"], "logstash.jvm.{0}"),
    (&["process"], "logstash.process.{0}"),
    (&["pipeline", "events"], "logstash.pipeline.events.{0}"),
];

/// Builds the flat metrics set of one stats document
#[derive(Debug, Default, Clone, Copy)]
pub struct StatsAssembler;

impl StatsAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Flattens the JVM, process and pipeline event sections and adds the
    /// probe version. A missing or non-object section fails the whole call.
    pub fn assemble(&self, stats: &Value) -> Result<FlatMetrics, ProbeError> {
        let mut metrics = FlatMetrics::new();

        for (path, template) in SECTIONS {
            let section = Self::section(stats, path)?;
            // Scalars land on `template.format(key)`, objects recurse with `template.nested(key)`
            let flat = flatten(&KeyTemplate::new(*template), section);
            debug!("Section {} contributed {} keys", path.join("."), flat.len());
            metrics.extend(flat);
        }

        metrics.insert(VERSION_KEY.to_string(), Value::String(PROBE_VERSION.to_string()));
        Ok(metrics)
    }

    fn section<'a>(stats: &'a Value, path: &[&str]) -> Result<&'a Value, ProbeError> {
        let mut current = stats;
        for (depth, segment) in path.iter().enumerate() {
            let walked = path[..=depth].join(".");
            current = current
                .get(segment)
                .ok_or_else(|| ProbeError::SchemaViolation(walked.clone()))?;
            if !current.is_object() {
                warn!("Section {} is {}, expected an object", walked, kind_of(current));
                return Err(ProbeError::SchemaViolation(walked));
            }
        }
        Ok(current)
    }
}
