//! Logstash metrics flattening
//!
//! Turns the nested `/_node/stats/` document into flat Zabbix item keys:
//! - `KeyTemplate` renders one key segment into a dotted path
//! - `flatten` walks a JSON object and keeps every non-object value as a leaf
//! - `assembler` picks the sections the probe reports (JVM, process, pipeline events)

pub mod assembler;

use crate::error::ProbeError;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, error};

pub use assembler::StatsAssembler;

/// Dotted metric key → leaf value (string, number, bool, null or an untouched array)
pub type FlatMetrics = BTreeMap<String, Value>;

const PLACEHOLDER: &str = "{0}";

/// Key template with a trailing `{0}` slot, e.g. `logstash.jvm.{0}`.
///
/// Only the rendered prefix is kept; segments are appended to it and never
/// re-parsed, so a JSON key containing `{0}` stays literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate {
    prefix: String,
}

impl KeyTemplate {
    /// Builds a template from `<prefix>{0}`
    pub fn new(template: &str) -> Self {
        Self {
            prefix: template.strip_suffix(PLACEHOLDER).unwrap_or(template).to_string(),
        }
    }

    /// Key for `segment` at this level
    pub fn format(&self, segment: &str) -> String {
        format!("{}{}", self.prefix, segment)
    }

    /// Template for the children of `segment`
    pub fn nested(&self, segment: &str) -> Self {
        Self {
            prefix: format!("{}{}.", self.prefix, segment),
        }
    }

    /// Rendered key prefix, e.g. `logstash.jvm.`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl std::fmt::Display for KeyTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.prefix, PLACEHOLDER)
    }
}

/// Flattens `node` under `template`.
///
/// Objects are descended into; every other value is stored as-is. A `node`
/// that is not an object is logged as a shape mismatch and yields an empty map.
pub fn flatten(template: &KeyTemplate, node: &Value) -> FlatMetrics {
    let mut metrics = FlatMetrics::new();
    flatten_into(&mut metrics, template, node);
    metrics
}

/// Same as `flatten`, merging into an existing map (later keys win)
pub(crate) fn flatten_into(metrics: &mut FlatMetrics, template: &KeyTemplate, node: &Value) {
    let Value::Object(entries) = node else {
        let mismatch = ProbeError::ShapeMismatch {
            key: template.prefix().trim_end_matches('.').to_string(),
            found: kind_of(node),
        };
        error!("{}", mismatch);
        return;
    };

    for (segment, value) in entries {
        match value {
            Value::Object(_) => flatten_into(metrics, &template.nested(segment), value),
            Value::Array(_)
            | Value::String(_)
            | Value::Number(_)
            | Value::Bool(_)
            | Value::Null => {
                metrics.insert(template.format(segment), value.clone());
            }
        }
    }
    debug!("Flattened {} under {} ({} keys so far)", entries.len(), template, metrics.len());
}

/// JSON kind name, for log lines
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
