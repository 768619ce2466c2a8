use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MetricError, Result};

/// Whether a metric measures privacy risk or utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Privacy,
    Utility,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Privacy => "privacy",
            MetricKind::Utility => "utility",
        }
    }

    /// Short dimension tag used in normalized score records.
    pub fn dim(self) -> &'static str {
        match self {
            MetricKind::Privacy => "p",
            MetricKind::Utility => "u",
        }
    }
}

/// Result mapping returned by `evaluate`: statistic name to value.
pub type MetricOutput = BTreeMap<String, f64>;

/// Canonical record for cross-metric comparison. `val`/`err` carry the raw
/// statistic and its uncertainty; `n_val`/`n_err` are oriented so that
/// higher is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedScore {
    pub metric: String,
    pub dim: String,
    pub val: f64,
    pub err: f64,
    pub n_val: f64,
    pub n_err: f64,
}

/// Options recognized by `evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateOptions {
    /// Tolerance on the scaled absolute error when scoring numerical
    /// attribute disclosure.
    pub numerical_dist_thresh: f64,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            numerical_dist_thresh: 1.0 / 30.0,
        }
    }
}

/// Evaluation state of a metric instance. A transition out of
/// `Uninitialized` happens only via `evaluate`; repeated evaluation
/// overwrites, never merges.
#[derive(Debug, Clone)]
pub enum MetricState<T> {
    Uninitialized,
    Evaluated(T),
    /// `evaluate` ran but the metric was not applicable to this dataset.
    OptedOut,
}

impl<T> MetricState<T> {
    /// The evaluated result, or a defined error naming the metric when
    /// `evaluate` has not run yet. Opted-out metrics report as evaluated
    /// with no result.
    pub fn require(&self, metric: &'static str) -> Result<Option<&T>> {
        match self {
            MetricState::Uninitialized => Err(MetricError::NotEvaluated { metric }),
            MetricState::Evaluated(result) => Ok(Some(result)),
            MetricState::OptedOut => Ok(None),
        }
    }
}

/// Uniform contract every metric satisfies.
///
/// `evaluate` is the only mutating operation: it computes the metric from
/// the splits bound at construction, stores the result on the instance, and
/// returns it as an owned mapping. `format_output` and `normalize_output`
/// read the stored result and fail with `MetricError::NotEvaluated` before
/// the first `evaluate` call.
pub trait Metric {
    /// Stable string key referencing the metric.
    fn name(&self) -> &'static str;

    /// Privacy or utility.
    fn kind(&self) -> MetricKind;

    /// Compute the metric and store the result on the instance.
    fn evaluate(&mut self, options: &EvaluateOptions) -> Result<MetricOutput>;

    /// Render the stored result as a fixed-width console block.
    fn format_output(&self) -> Result<String>;

    /// Map the stored result to zero-or-one normalized score records; an
    /// opted-out metric yields an empty vector.
    fn normalize_output(&self) -> Result<Vec<NormalizedScore>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags() {
        assert_eq!(MetricKind::Privacy.as_str(), "privacy");
        assert_eq!(MetricKind::Privacy.dim(), "p");
        assert_eq!(MetricKind::Utility.dim(), "u");
    }

    #[test]
    fn default_threshold_is_one_thirtieth() {
        let options = EvaluateOptions::default();
        assert!((options.numerical_dist_thresh - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn state_machine_guards_uninitialized_reads() {
        let state: MetricState<f64> = MetricState::Uninitialized;
        assert!(matches!(
            state.require("demo"),
            Err(MetricError::NotEvaluated { metric: "demo" })
        ));

        let state = MetricState::Evaluated(1.0);
        assert_eq!(state.require("demo").unwrap(), Some(&1.0));

        let state: MetricState<f64> = MetricState::OptedOut;
        assert_eq!(state.require("demo").unwrap(), None);
    }

    #[test]
    fn normalized_score_serializes_flat() {
        let score = NormalizedScore {
            metric: "demo".to_string(),
            dim: "p".to_string(),
            val: 0.5,
            err: 0.1,
            n_val: 0.5,
            n_err: 0.1,
        };
        let json = serde_json::to_value(&score).expect("serialize");
        assert_eq!(json["dim"], "p");
        assert_eq!(json["n_val"], 0.5);
    }
}
