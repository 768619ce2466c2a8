//! Privacy-risk metrics for synthetic tabular datasets.
//!
//! The engine simulates an adversary with access to a synthetic dataset and
//! measures what it can infer about the real dataset the synthesis
//! imitated: an attribute disclosure attack trains a per-column attacker on
//! synthetic rows, and a distance-to-closest-record metric compares
//! synthetic-to-real nearest-neighbor distances against the real-to-real
//! baseline. Metrics share a uniform contract and are selected at runtime
//! through a registry.

pub mod attack;
pub mod context;
pub mod distance;
pub mod error;
pub mod metric;
pub mod privacy;
pub mod registry;
pub mod scores;

pub use attack::{AttackModel, AttackTask, ForestConfig, RandomForest};
pub use context::EvalContext;
pub use distance::{knn_distance, DistanceKind};
pub use error::{MetricError, Result};
pub use metric::{
    EvaluateOptions, Metric, MetricKind, MetricOutput, MetricState, NormalizedScore,
};
pub use privacy::{AttrDisclosureResult, AttributeDisclosure, DcrResult, MedianDcr};
pub use registry::MetricRegistry;
