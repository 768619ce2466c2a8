//! Core contracts and helpers for Synthrisk.
//!
//! This crate defines the tabular split model, the categorical/numerical
//! column partition, and the min-max scaling utility shared by the metric
//! implementations.

pub mod error;
pub mod frame;
pub mod partition;
pub mod scaling;

pub use error::{CoreError, Result};
pub use frame::{ColumnData, Frame, LabelEncoding};
pub use partition::{ColumnKind, ColumnPartition};
pub use scaling::MinMaxScaler;
