use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::frame::{ColumnData, Frame};

/// Declared kind of a column. Metrics dispatch per-column behavior on this
/// partition alone, never on raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Categorical,
    Numerical,
}

/// Classification of every column name into exactly one kind.
#[derive(Debug, Clone)]
pub struct ColumnPartition {
    cat_cols: Vec<String>,
    num_cols: Vec<String>,
    kinds: HashMap<String, ColumnKind>,
}

impl ColumnPartition {
    /// Build a partition from disjoint categorical/numerical name lists.
    pub fn new(cat_cols: Vec<String>, num_cols: Vec<String>) -> Result<Self> {
        let mut kinds = HashMap::with_capacity(cat_cols.len() + num_cols.len());
        for name in &cat_cols {
            if kinds.insert(name.clone(), ColumnKind::Categorical).is_some() {
                return Err(CoreError::InvalidPartition(format!(
                    "column '{name}' listed twice"
                )));
            }
        }
        for name in &num_cols {
            if kinds.insert(name.clone(), ColumnKind::Numerical).is_some() {
                return Err(CoreError::InvalidPartition(format!(
                    "column '{name}' listed as both categorical and numerical"
                )));
            }
        }
        Ok(Self {
            cat_cols,
            num_cols,
            kinds,
        })
    }

    pub fn cat_cols(&self) -> &[String] {
        &self.cat_cols
    }

    pub fn num_cols(&self) -> &[String] {
        &self.num_cols
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.kinds.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Check the partition is a total cover of the frame's columns and that
    /// each declared kind agrees with the column's storage.
    pub fn validate_frame(&self, frame: &Frame) -> Result<()> {
        for name in frame.names() {
            let kind = self.kind_of(name).ok_or_else(|| {
                CoreError::InvalidPartition(format!("column '{name}' missing from partition"))
            })?;
            let storage_ok = match (kind, frame.column(name)?) {
                (ColumnKind::Numerical, ColumnData::Numerical(_)) => true,
                (ColumnKind::Categorical, ColumnData::Categorical(_)) => true,
                _ => false,
            };
            if !storage_ok {
                return Err(CoreError::InvalidPartition(format!(
                    "column '{name}' storage disagrees with its declared kind"
                )));
            }
        }
        for name in self.kinds.keys() {
            if frame.column_index(name).is_none() {
                return Err(CoreError::InvalidPartition(format!(
                    "partition names column '{name}' absent from the frame"
                )));
            }
        }
        Ok(())
    }
}
