use synthrisk_core::{ColumnPartition, Frame};

use crate::distance::DistanceKind;
use crate::error::{MetricError, Result};

/// Construction-time inputs bound to every metric instance, supplied by an
/// external driver.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Required real split.
    pub real_data: Frame,
    /// Required synthetic split, identical schema to the real split.
    pub synt_data: Frame,
    /// Optional holdout split used as additional unseen evaluation targets.
    pub hout_data: Option<Frame>,
    /// Categorical/numerical classification of every column.
    pub partition: ColumnPartition,
    /// Keyword selecting the composite nearest-neighbor distance.
    pub nn_dist: DistanceKind,
    /// Base seed for attacker-model randomness.
    pub seed: u64,
    /// Whether optional diagnostics are invoked by external collaborators.
    pub verbose: bool,
    /// Focal attribute for metrics that need one; unused by the privacy
    /// metrics in this crate.
    pub analysis_target: Option<String>,
}

impl EvalContext {
    pub fn new(real_data: Frame, synt_data: Frame, partition: ColumnPartition) -> Self {
        Self {
            real_data,
            synt_data,
            hout_data: None,
            partition,
            nn_dist: DistanceKind::Gower,
            seed: 42,
            verbose: false,
            analysis_target: None,
        }
    }

    pub fn with_holdout(mut self, hout_data: Frame) -> Self {
        self.hout_data = Some(hout_data);
        self
    }

    pub fn with_distance(mut self, nn_dist: DistanceKind) -> Self {
        self.nn_dist = nn_dist;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_analysis_target(mut self, target: impl Into<String>) -> Self {
        self.analysis_target = Some(target.into());
        self
    }

    /// Every split present, in real/synthetic/holdout order.
    pub fn splits(&self) -> Vec<&Frame> {
        let mut frames = vec![&self.real_data, &self.synt_data];
        if let Some(hout) = &self.hout_data {
            frames.push(hout);
        }
        frames
    }

    /// Fatal configuration checks: identical schemas across splits and a
    /// total, storage-consistent column partition. Errors name the metric
    /// that rejected the configuration.
    pub fn validate(&self, metric: &'static str) -> Result<()> {
        if !self.real_data.schema_matches(&self.synt_data) {
            return Err(MetricError::Configuration {
                metric,
                detail: "real and synthetic splits declare different schemas".to_string(),
            });
        }
        if let Some(hout) = &self.hout_data {
            if !self.real_data.schema_matches(hout) {
                return Err(MetricError::Configuration {
                    metric,
                    detail: "holdout split declares a different schema".to_string(),
                });
            }
        }
        for frame in self.splits() {
            self.partition
                .validate_frame(frame)
                .map_err(|err| MetricError::Configuration {
                    metric,
                    detail: err.to_string(),
                })?;
        }
        Ok(())
    }
}
