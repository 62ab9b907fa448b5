//! Probe error kinds
//!
//! Each kind has its own handling:
//! - `Transport`: logged where it happens, propagated, fails the run
//! - `ShapeMismatch`: logged by the flattener, the branch is dropped, the run continues
//! - `SchemaViolation`: propagated, fails the run

/// Errors raised while collecting Logstash statistics
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The stats endpoint could not be read: connect, timeout, HTTP status >= 400 or bad body
    #[error("failed to open: {path}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// A node expected to be an object was something else
    #[error("failed to process items under '{key}': expected an object, found {found}")]
    ShapeMismatch { key: String, found: &'static str },
    /// A required section is missing from the stats document
    #[error("stats document has no usable '{0}' section")]
    SchemaViolation(String),
}
