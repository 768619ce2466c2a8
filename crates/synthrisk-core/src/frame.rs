use std::collections::HashMap;

use crate::error::{CoreError, Result};

/// Storage for one named column of a tabular split.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numerical(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numerical(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slice(&self, start: usize, end: usize) -> ColumnData {
        match self {
            ColumnData::Numerical(values) => ColumnData::Numerical(values[start..end].to_vec()),
            ColumnData::Categorical(values) => ColumnData::Categorical(values[start..end].to_vec()),
        }
    }

    fn append(&mut self, other: &ColumnData) -> Result<()> {
        match (self, other) {
            (ColumnData::Numerical(dst), ColumnData::Numerical(src)) => {
                dst.extend_from_slice(src);
                Ok(())
            }
            (ColumnData::Categorical(dst), ColumnData::Categorical(src)) => {
                dst.extend_from_slice(src);
                Ok(())
            }
            _ => Err(CoreError::SchemaMismatch(
                "cannot concatenate numerical and categorical storage".to_string(),
            )),
        }
    }
}

/// A tabular split: rows by named columns, shared by real/synthetic/holdout
/// data. Row order carries no meaning and row identity is not tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
    columns: Vec<ColumnData>,
    rows: usize,
}

impl Frame {
    /// Build a frame from named columns, rejecting duplicates and ragged
    /// column lengths.
    pub fn from_columns(columns: Vec<(String, ColumnData)>) -> Result<Self> {
        let mut names = Vec::with_capacity(columns.len());
        let mut lookup = HashMap::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        let mut rows = None;

        for (name, column) in columns {
            if lookup.contains_key(&name) {
                return Err(CoreError::DuplicateColumn(name));
            }
            let expected = *rows.get_or_insert(column.len());
            if column.len() != expected {
                return Err(CoreError::ColumnLengthMismatch {
                    column: name,
                    expected,
                    found: column.len(),
                });
            }
            lookup.insert(name.clone(), data.len());
            names.push(name);
            data.push(column);
        }

        Ok(Self {
            names,
            lookup,
            columns: data,
            rows: rows.unwrap_or(0),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Result<&ColumnData> {
        self.column_index(name)
            .map(|idx| &self.columns[idx])
            .ok_or_else(|| CoreError::UnknownColumn(name.to_string()))
    }

    pub fn column_at(&self, idx: usize) -> &ColumnData {
        &self.columns[idx]
    }

    /// Replace a column's storage in place. The new data must keep the row
    /// count intact.
    pub fn set_column(&mut self, name: &str, data: ColumnData) -> Result<()> {
        if data.len() != self.rows {
            return Err(CoreError::ColumnLengthMismatch {
                column: name.to_string(),
                expected: self.rows,
                found: data.len(),
            });
        }
        let idx = self
            .column_index(name)
            .ok_or_else(|| CoreError::UnknownColumn(name.to_string()))?;
        self.columns[idx] = data;
        Ok(())
    }

    /// True when `other` declares the same column names, order, and storage
    /// kinds.
    pub fn schema_matches(&self, other: &Frame) -> bool {
        self.names == other.names
            && self
                .columns
                .iter()
                .zip(other.columns.iter())
                .all(|(a, b)| {
                    matches!(
                        (a, b),
                        (ColumnData::Numerical(_), ColumnData::Numerical(_))
                            | (ColumnData::Categorical(_), ColumnData::Categorical(_))
                    )
                })
    }

    /// Vertically concatenate frames with an identical schema.
    pub fn concat(frames: &[&Frame]) -> Result<Frame> {
        let first = frames
            .first()
            .ok_or_else(|| CoreError::SchemaMismatch("no frames to concatenate".to_string()))?;
        let mut combined = (*first).clone();
        for frame in &frames[1..] {
            if !first.schema_matches(frame) {
                return Err(CoreError::SchemaMismatch(
                    "frames declare different column schemas".to_string(),
                ));
            }
            for (dst, src) in combined.columns.iter_mut().zip(frame.columns.iter()) {
                dst.append(src)?;
            }
            combined.rows += frame.rows;
        }
        Ok(combined)
    }

    /// Split the frame back into consecutive row blocks. The counts must sum
    /// to the frame's row count.
    pub fn split_rows(&self, counts: &[usize]) -> Result<Vec<Frame>> {
        let total: usize = counts.iter().sum();
        if total != self.rows {
            return Err(CoreError::InvalidSplit(format!(
                "row counts sum to {total}, frame has {} rows",
                self.rows
            )));
        }

        let mut parts = Vec::with_capacity(counts.len());
        let mut start = 0;
        for &count in counts {
            let end = start + count;
            let columns = self
                .names
                .iter()
                .cloned()
                .zip(self.columns.iter().map(|col| col.slice(start, end)))
                .collect();
            parts.push(Frame::from_columns(columns)?);
            start = end;
        }
        Ok(parts)
    }
}

/// Deterministic label encoding for one categorical column: sorted unique
/// values map to dense integer codes.
#[derive(Debug, Clone)]
pub struct LabelEncoding {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoding {
    /// Fit over every categorical value the given frames hold for `column`.
    pub fn fit(frames: &[&Frame], column: &str) -> Result<Self> {
        let mut classes = Vec::new();
        for frame in frames {
            match frame.column(column)? {
                ColumnData::Categorical(values) => classes.extend(values.iter().cloned()),
                ColumnData::Numerical(_) => {
                    return Err(CoreError::SchemaMismatch(format!(
                        "column '{column}' holds numerical storage, cannot label-encode"
                    )));
                }
            }
        }
        classes.sort();
        classes.dedup();
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code))
            .collect();
        Ok(Self { classes, index })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// Encode a whole column; values outside the fitted vocabulary are a
    /// schema error.
    pub fn encode_column(&self, values: &[String]) -> Result<Vec<usize>> {
        values
            .iter()
            .map(|value| {
                self.encode(value)
                    .ok_or_else(|| CoreError::SchemaMismatch(format!("unseen category '{value}'")))
            })
            .collect()
    }
}
