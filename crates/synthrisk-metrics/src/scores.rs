//! Macro-averaged classification scores and aggregation helpers.
//!
//! Scoring runs over the union of labels observed in the truth and the
//! predictions, with zero-division cases scored as 0 rather than raised.

/// Macro-averaged (precision, recall, F1) for one attacked column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreTriple {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Compute macro precision/recall/F1 from label codes. Labels are the
/// sorted union of observed truth and prediction codes; every zero-division
/// contributes 0 to the average.
pub fn macro_scores(y_true: &[usize], y_pred: &[usize]) -> ScoreTriple {
    debug_assert_eq!(y_true.len(), y_pred.len());
    let mut labels: Vec<usize> = y_true.iter().chain(y_pred.iter()).copied().collect();
    labels.sort_unstable();
    labels.dedup();
    if labels.is_empty() {
        return ScoreTriple {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
        };
    }

    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;
    let mut f1_sum = 0.0;
    for &label in &labels {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (&truth, &pred) in y_true.iter().zip(y_pred.iter()) {
            match (truth == label, pred == label) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }
        let precision = ratio_or_zero(tp, tp + fp);
        let recall = ratio_or_zero(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        precision_sum += precision;
        recall_sum += recall;
        f1_sum += f1;
    }

    let n = labels.len() as f64;
    ScoreTriple {
        precision: precision_sum / n,
        recall: recall_sum / n,
        f1: f1_sum / n,
    }
}

fn ratio_or_zero(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Arithmetic mean; 0 for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard error of the mean: sample standard deviation (ddof 1) over √n.
/// Samples of fewer than two values score 0.
pub fn standard_error(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = mean(values);
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n as f64 - 1.0);
    variance.sqrt() / (n as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn perfect_predictions_score_one() {
        let y = vec![0, 1, 2, 0, 1, 2];
        let scores = macro_scores(&y, &y);
        assert_relative_eq!(scores.precision, 1.0);
        assert_relative_eq!(scores.recall, 1.0);
        assert_relative_eq!(scores.f1, 1.0);
    }

    #[test]
    fn matches_sklearn_macro_reference() {
        // sklearn 1.4.0: precision/recall/f1(average='macro') all equal
        // 0.6666666666666666 for this vector pair.
        let y_true = vec![0, 0, 1, 1, 2, 2, 0, 1, 2];
        let y_pred = vec![0, 1, 1, 2, 2, 0, 0, 1, 2];
        let scores = macro_scores(&y_true, &y_pred);
        assert_relative_eq!(scores.precision, 0.6666666666666666, epsilon = 1e-9);
        assert_relative_eq!(scores.recall, 0.6666666666666666, epsilon = 1e-9);
        assert_relative_eq!(scores.f1, 0.6666666666666666, epsilon = 1e-9);
    }

    #[test]
    fn matches_sklearn_imbalanced_reference() {
        // Class 0: P=0.75 R=0.6, class 1: P=1/3 R=0.5, class 2: P=1 R=1.
        let y_true = vec![0, 0, 0, 0, 0, 1, 1, 2];
        let y_pred = vec![0, 0, 0, 1, 1, 1, 0, 2];
        let scores = macro_scores(&y_true, &y_pred);
        assert_relative_eq!(scores.f1, 0.6888888888888888, epsilon = 1e-9);
    }

    #[test]
    fn zero_division_scores_zero_instead_of_raising() {
        // Class 1 never predicted: its precision is 0/0 and must score 0.
        let y_true = vec![0, 1, 1];
        let y_pred = vec![0, 0, 0];
        let scores = macro_scores(&y_true, &y_pred);
        assert_relative_eq!(scores.precision, 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(scores.recall, 0.5);
    }

    #[test]
    fn degenerate_disclosure_labels_keep_their_convention() {
        // Numerical attack path: truth is all ones, predictions mix 0/1.
        // The union of labels is {0, 1}, so macro recall is half the
        // disclosure rate.
        let y_true = vec![1, 1, 1, 1];
        let y_pred = vec![1, 1, 0, 1];
        let scores = macro_scores(&y_true, &y_pred);
        assert_relative_eq!(scores.precision, 0.5);
        assert_relative_eq!(scores.recall, 0.375);
    }

    #[test]
    fn all_disclosed_scores_one() {
        let y_true = vec![1, 1, 1];
        let y_pred = vec![1, 1, 1];
        let scores = macro_scores(&y_true, &y_pred);
        assert_relative_eq!(scores.f1, 1.0);
    }

    #[test]
    fn mean_and_standard_error() {
        let values = vec![0.2, 0.4, 0.6];
        assert_relative_eq!(mean(&values), 0.4);
        // sample std = 0.2, se = 0.2 / sqrt(3)
        assert_relative_eq!(standard_error(&values), 0.2 / 3.0f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(standard_error(&[0.5]), 0.0);
    }
}
