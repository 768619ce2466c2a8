use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::frame::{ColumnData, Frame};

/// Min-max scaler fitted over the union of the frames being compared, so
/// distances and thresholds are comparable across splits.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    ranges: HashMap<String, (f64, f64)>,
}

impl MinMaxScaler {
    /// Fit ranges for the given numerical columns across every frame.
    pub fn fit(frames: &[&Frame], num_cols: &[String]) -> Result<Self> {
        let mut ranges = HashMap::with_capacity(num_cols.len());
        for name in num_cols {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for frame in frames {
                match frame.column(name)? {
                    ColumnData::Numerical(values) => {
                        for &value in values {
                            min = min.min(value);
                            max = max.max(value);
                        }
                    }
                    ColumnData::Categorical(_) => {
                        return Err(CoreError::SchemaMismatch(format!(
                            "column '{name}' is categorical, cannot min-max scale"
                        )));
                    }
                }
            }
            ranges.insert(name.clone(), (min, max));
        }
        Ok(Self { ranges })
    }

    /// Fitted (min, max) for a column, if it was part of the fit.
    pub fn range(&self, name: &str) -> Option<(f64, f64)> {
        self.ranges.get(name).copied()
    }

    /// Return a copy of the frame with the fitted columns rescaled to [0, 1].
    /// Columns outside the fit are left untouched; a constant column maps
    /// to 0.0.
    pub fn transform(&self, frame: &Frame) -> Result<Frame> {
        let mut scaled = frame.clone();
        for (name, &(min, max)) in &self.ranges {
            let values = match frame.column(name)? {
                ColumnData::Numerical(values) => values,
                ColumnData::Categorical(_) => {
                    return Err(CoreError::SchemaMismatch(format!(
                        "column '{name}' is categorical, cannot min-max scale"
                    )));
                }
            };
            let span = max - min;
            let rescaled = values
                .iter()
                .map(|&value| if span > 0.0 { (value - min) / span } else { 0.0 })
                .collect();
            scaled.set_column(name, ColumnData::Numerical(rescaled))?;
        }
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;

    fn numeric_frame(name: &str, values: Vec<f64>) -> Frame {
        Frame::from_columns(vec![(name.to_string(), ColumnData::Numerical(values))])
            .expect("frame")
    }

    fn column_values(frame: &Frame, name: &str) -> Vec<f64> {
        match frame.column(name).expect("column") {
            ColumnData::Numerical(values) => values.clone(),
            ColumnData::Categorical(_) => unreachable!(),
        }
    }

    #[test]
    fn scales_union_of_frames() {
        let a = numeric_frame("n", vec![0.0, 5.0]);
        let b = numeric_frame("n", vec![10.0]);
        let scaler = MinMaxScaler::fit(&[&a, &b], &["n".to_string()]).expect("fit");

        assert_eq!(scaler.range("n"), Some((0.0, 10.0)));
        let scaled = scaler.transform(&a).expect("transform");
        assert_relative_eq!(column_values(&scaled, "n")[1], 0.5);
    }

    #[test]
    fn scaling_already_scaled_column_is_identity() {
        let frame = numeric_frame("n", vec![0.0, 0.25, 1.0]);
        let scaler = MinMaxScaler::fit(&[&frame], &["n".to_string()]).expect("fit");
        let scaled = scaler.transform(&frame).expect("transform");
        assert_eq!(column_values(&scaled, "n"), vec![0.0, 0.25, 1.0]);
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let frame = numeric_frame("n", vec![3.0, 3.0, 3.0]);
        let scaler = MinMaxScaler::fit(&[&frame], &["n".to_string()]).expect("fit");
        let scaled = scaler.transform(&frame).expect("transform");
        assert_eq!(column_values(&scaled, "n"), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn untouched_columns_pass_through() {
        let frame = Frame::from_columns(vec![
            ("n".to_string(), ColumnData::Numerical(vec![0.0, 4.0])),
            (
                "c".to_string(),
                ColumnData::Categorical(vec!["a".to_string(), "b".to_string()]),
            ),
        ])
        .expect("frame");
        let scaler = MinMaxScaler::fit(&[&frame], &["n".to_string()]).expect("fit");
        let scaled = scaler.transform(&frame).expect("transform");
        assert_eq!(frame.column("c").unwrap(), scaled.column("c").unwrap());
    }

    proptest! {
        #[test]
        fn transformed_values_stay_in_unit_interval(
            values in prop::collection::vec(-1e6f64..1e6, 1..64)
        ) {
            let frame = numeric_frame("n", values);
            let scaler = MinMaxScaler::fit(&[&frame], &["n".to_string()]).unwrap();
            let scaled = scaler.transform(&frame).unwrap();
            for value in column_values(&scaled, "n") {
                prop_assert!((0.0..=1.0).contains(&value));
            }
        }
    }
}
