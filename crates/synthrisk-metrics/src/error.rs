use thiserror::Error;

use synthrisk_core::CoreError;

/// Errors emitted by the metric engine.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("metric '{metric}': configuration error: {detail}")]
    Configuration {
        metric: &'static str,
        detail: String,
    },
    #[error("metric '{metric}' has no result yet, call evaluate first")]
    NotEvaluated { metric: &'static str },
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
    #[error("unknown distance keyword '{0}'")]
    UnknownDistance(String),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Convenience alias for metric operations.
pub type Result<T> = std::result::Result<T, MetricError>;
