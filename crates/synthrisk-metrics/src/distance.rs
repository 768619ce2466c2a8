use std::fmt;
use std::str::FromStr;

use synthrisk_core::{ColumnData, ColumnPartition, Frame};

use crate::error::{MetricError, Result};

/// Keyword selecting the composite mixed-type distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceKind {
    /// Squared numerical differences plus a categorical mismatch count,
    /// square-rooted.
    Euclid,
    /// Range-normalized absolute numerical differences plus categorical
    /// mismatch indicators, averaged over all columns.
    Gower,
}

impl DistanceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceKind::Euclid => "euclid",
            DistanceKind::Gower => "gower",
        }
    }
}

impl fmt::Display for DistanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceKind {
    type Err = MetricError;

    fn from_str(keyword: &str) -> Result<Self> {
        match keyword {
            "euclid" => Ok(DistanceKind::Euclid),
            "gower" => Ok(DistanceKind::Gower),
            other => Err(MetricError::UnknownDistance(other.to_string())),
        }
    }
}

/// Column slices of one frame, resolved once in partition order.
struct FrameView<'a> {
    num: Vec<&'a [f64]>,
    cat: Vec<&'a [String]>,
}

impl<'a> FrameView<'a> {
    fn new(frame: &'a Frame, partition: &ColumnPartition, metric: &'static str) -> Result<Self> {
        let mut num = Vec::with_capacity(partition.num_cols().len());
        for name in partition.num_cols() {
            match frame.column(name)? {
                ColumnData::Numerical(values) => num.push(values.as_slice()),
                ColumnData::Categorical(_) => {
                    return Err(MetricError::Configuration {
                        metric,
                        detail: format!("column '{name}' is not numerical storage"),
                    });
                }
            }
        }
        let mut cat = Vec::with_capacity(partition.cat_cols().len());
        for name in partition.cat_cols() {
            match frame.column(name)? {
                ColumnData::Categorical(values) => cat.push(values.as_slice()),
                ColumnData::Numerical(_) => {
                    return Err(MetricError::Configuration {
                        metric,
                        detail: format!("column '{name}' is not categorical storage"),
                    });
                }
            }
        }
        Ok(Self { num, cat })
    }
}

/// Distance from every row of `query` to its k-th nearest neighbor in
/// `reference` under the composite metric. With `exclude_self`, row `i` of
/// the query skips row `i` of the reference, which gives the real-to-real
/// self-distance baseline when both arguments are the same frame.
/// Configuration errors name `metric`, the metric that requested the
/// distances.
pub fn knn_distance(
    query: &Frame,
    reference: &Frame,
    partition: &ColumnPartition,
    k: usize,
    kind: DistanceKind,
    exclude_self: bool,
    metric: &'static str,
) -> Result<Vec<f64>> {
    if k == 0 {
        return Err(MetricError::Configuration {
            metric,
            detail: "k must be at least 1".to_string(),
        });
    }
    if partition.is_empty() {
        return Err(MetricError::Configuration {
            metric,
            detail: "no columns to compare".to_string(),
        });
    }
    let available = reference.rows().saturating_sub(usize::from(exclude_self));
    if available < k {
        return Err(MetricError::Configuration {
            metric,
            detail: format!(
                "reference holds {available} usable rows, need at least {k}"
            ),
        });
    }

    let query_view = FrameView::new(query, partition, metric)?;
    let reference_view = FrameView::new(reference, partition, metric)?;
    let ranges = match kind {
        DistanceKind::Gower => gower_ranges(&query_view, &reference_view),
        DistanceKind::Euclid => Vec::new(),
    };
    let total_cols = partition.len() as f64;

    let mut out = Vec::with_capacity(query.rows());
    let mut nearest = Vec::with_capacity(k + 1);
    for i in 0..query.rows() {
        nearest.clear();
        for j in 0..reference.rows() {
            if exclude_self && i == j {
                continue;
            }
            let distance = match kind {
                DistanceKind::Euclid => euclid(&query_view, &reference_view, i, j),
                DistanceKind::Gower => gower(&query_view, &reference_view, &ranges, i, j, total_cols),
            };
            if nearest.len() < k || distance < *nearest.last().unwrap_or(&f64::INFINITY) {
                let pos = nearest.partition_point(|&d| d < distance);
                nearest.insert(pos, distance);
                nearest.truncate(k);
            }
        }
        out.push(nearest[k - 1]);
    }
    Ok(out)
}

fn euclid(a: &FrameView<'_>, b: &FrameView<'_>, i: usize, j: usize) -> f64 {
    let mut sum = 0.0;
    for (qa, qb) in a.num.iter().zip(b.num.iter()) {
        let diff = qa[i] - qb[j];
        sum += diff * diff;
    }
    for (ca, cb) in a.cat.iter().zip(b.cat.iter()) {
        if ca[i] != cb[j] {
            sum += 1.0;
        }
    }
    sum.sqrt()
}

fn gower(
    a: &FrameView<'_>,
    b: &FrameView<'_>,
    ranges: &[f64],
    i: usize,
    j: usize,
    total_cols: f64,
) -> f64 {
    let mut sum = 0.0;
    for ((qa, qb), &range) in a.num.iter().zip(b.num.iter()).zip(ranges.iter()) {
        if range > 0.0 {
            sum += (qa[i] - qb[j]).abs() / range;
        }
    }
    for (ca, cb) in a.cat.iter().zip(b.cat.iter()) {
        if ca[i] != cb[j] {
            sum += 1.0;
        }
    }
    sum / total_cols
}

/// Per-column value ranges over both frames, used to normalize the gower
/// numerical contributions.
fn gower_ranges(a: &FrameView<'_>, b: &FrameView<'_>) -> Vec<f64> {
    a.num
        .iter()
        .zip(b.num.iter())
        .map(|(qa, qb)| {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &value in qa.iter().chain(qb.iter()) {
                min = min.min(value);
                max = max.max(value);
            }
            max - min
        })
        .collect()
}
