//! Error types for snapshot acquisition and sampling.
//!
//! All sampling failures are absorbed at the tick boundary: they are
//! logged and counted, but never crash the sampling loop. The next
//! scheduled tick is the implicit retry.

use std::time::Duration;

use crate::registry::MetricCategory;

/// Failure of the OS-facing snapshot provider for one category.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected format in {path}: {detail}")]
    Format { path: String, detail: String },

    /// Delta-based readings need a previous observation; the first call
    /// after startup has none. The next tick succeeds.
    #[error("{what} not ready yet, needs a previous reading")]
    NotReady { what: &'static str },

    #[error("{what} is not available on this host")]
    Unsupported { what: &'static str },

    #[error("snapshot task failed: {0}")]
    Task(String),
}

/// Failure of one category during a sampling tick.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("snapshot provider failed for {category}: {source}")]
    ProviderUnavailable {
        category: MetricCategory,
        #[source]
        source: ProviderError,
    },

    #[error("snapshot acquisition for {category} timed out after {timeout:?}")]
    Timeout {
        category: MetricCategory,
        timeout: Duration,
    },

    #[error("malformed reading for {series}: {raw:?}")]
    MalformedReading { series: String, raw: String },
}
