use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use synthrisk_core::{ColumnData, ColumnKind, Frame, LabelEncoding, MinMaxScaler};

use crate::attack::{hash_seed, AttackModel, RandomForest};
use crate::context::EvalContext;
use crate::error::{MetricError, Result};
use crate::metric::{
    EvaluateOptions, Metric, MetricKind, MetricOutput, MetricState, NormalizedScore,
};
use crate::scores::{macro_scores, mean, standard_error, ScoreTriple};

/// Mean and standard error of the per-column attack scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttrDisclosureResult {
    pub precision: f64,
    pub precision_se: f64,
    pub recall: f64,
    pub recall_se: f64,
    pub f1: f64,
    pub f1_se: f64,
}

/// Attribute disclosure risk: a worst-case adversary who knows every
/// attribute of a record except one target attribute and trains a
/// per-column attacker on the synthetic split to reconstruct it. Scores
/// are macro precision/recall/F1 against the real (+holdout) population,
/// averaged over all columns.
#[derive(Debug, Clone)]
pub struct AttributeDisclosure {
    ctx: EvalContext,
    state: MetricState<AttrDisclosureResult>,
}

impl AttributeDisclosure {
    pub const NAME: &'static str = "attr_discl";
    pub const KIND: MetricKind = MetricKind::Privacy;

    pub fn new(ctx: EvalContext) -> Self {
        Self {
            ctx,
            state: MetricState::Uninitialized,
        }
    }

    pub fn result(&self) -> Option<&AttrDisclosureResult> {
        match &self.state {
            MetricState::Evaluated(result) => Some(result),
            _ => None,
        }
    }
}

impl Metric for AttributeDisclosure {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        Self::KIND
    }

    fn evaluate(&mut self, options: &EvaluateOptions) -> Result<MetricOutput> {
        self.ctx.validate(Self::NAME)?;
        let names: Vec<String> = self.ctx.real_data.names().to_vec();
        if names.is_empty() {
            warn!(metric = Self::NAME, "no columns to attack, opting out");
            self.state = MetricState::OptedOut;
            return Ok(MetricOutput::new());
        }
        if self.ctx.real_data.is_empty() || self.ctx.synt_data.is_empty() {
            return Err(MetricError::Configuration {
                metric: Self::NAME,
                detail: "real and synthetic splits must both hold rows".to_string(),
            });
        }

        // Scale numerics over the union of splits, then split back by the
        // original row counts so the partitions stay disjoint.
        let frames = self.ctx.splits();
        let counts: Vec<usize> = frames.iter().map(|frame| frame.rows()).collect();
        let scaler = MinMaxScaler::fit(&frames, self.ctx.partition.num_cols())?;
        let combined = Frame::concat(&frames)?;
        let scaled = scaler.transform(&combined)?;
        let parts = scaled.split_rows(&counts)?;
        let (real_scaled, syn_scaled) = (&parts[0], &parts[1]);
        let eval_pop = match parts.get(2) {
            Some(hout_scaled) => Frame::concat(&[real_scaled, hout_scaled])?,
            None => real_scaled.clone(),
        };

        let mut encodings = HashMap::new();
        for name in self.ctx.partition.cat_cols() {
            encodings.insert(name.clone(), LabelEncoding::fit(&[&combined], name)?);
        }
        let syn_matrix = encode_rows(syn_scaled, &names, &encodings)?;
        let eval_matrix = encode_rows(&eval_pop, &names, &encodings)?;

        let mut triples = Vec::with_capacity(names.len());
        for (target, name) in names.iter().enumerate() {
            let kind = self.ctx.partition.kind_of(name).ok_or_else(|| {
                MetricError::Configuration {
                    metric: Self::NAME,
                    detail: format!("column '{name}' missing from partition"),
                }
            })?;
            let triple = attack_column(
                &syn_matrix,
                &eval_matrix,
                target,
                kind,
                hash_seed(self.ctx.seed, name),
                options.numerical_dist_thresh,
            )?;
            triples.push(triple);
        }

        let precision: Vec<f64> = triples.iter().map(|t| t.precision).collect();
        let recall: Vec<f64> = triples.iter().map(|t| t.recall).collect();
        let f1: Vec<f64> = triples.iter().map(|t| t.f1).collect();
        let result = AttrDisclosureResult {
            precision: mean(&precision),
            precision_se: standard_error(&precision),
            recall: mean(&recall),
            recall_se: standard_error(&recall),
            f1: mean(&f1),
            f1_se: standard_error(&f1),
        };
        info!(
            metric = Self::NAME,
            columns = names.len(),
            f1 = result.f1,
            "attribute disclosure evaluated"
        );

        let output = output_map(&result);
        self.state = MetricState::Evaluated(result);
        Ok(output)
    }

    fn format_output(&self) -> Result<String> {
        let Some(result) = self.state.require(Self::NAME)? else {
            return Ok(String::new());
        };
        Ok(format!(
            "\
| Attribute disclosure risk (macro F1)     :   {:.4}  {:.4}   |
|   -> Precision                           :   {:.4}  {:.4}   |
|   -> Recall                              :   {:.4}  {:.4}   |",
            result.f1,
            result.f1_se,
            result.precision,
            result.precision_se,
            result.recall,
            result.recall_se
        ))
    }

    fn normalize_output(&self) -> Result<Vec<NormalizedScore>> {
        let Some(result) = self.state.require(Self::NAME)? else {
            return Ok(Vec::new());
        };
        // Higher disclosure risk is worse privacy, so the oriented score is
        // the complement of the macro F1.
        Ok(vec![NormalizedScore {
            metric: "attr_discl_risk".to_string(),
            dim: Self::KIND.dim().to_string(),
            val: result.f1,
            err: result.f1_se,
            n_val: 1.0 - result.f1,
            n_err: result.f1_se,
        }])
    }
}

fn output_map(result: &AttrDisclosureResult) -> MetricOutput {
    MetricOutput::from([
        ("precision".to_string(), result.precision),
        ("precision_se".to_string(), result.precision_se),
        ("recall".to_string(), result.recall),
        ("recall_se".to_string(), result.recall_se),
        ("f1".to_string(), result.f1),
        ("f1_se".to_string(), result.f1_se),
    ])
}

/// Dense row-major encoding of a frame: scaled numerics pass through,
/// categoricals become label codes.
fn encode_rows(
    frame: &Frame,
    names: &[String],
    encodings: &HashMap<String, LabelEncoding>,
) -> Result<Vec<Vec<f64>>> {
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let encoded = match frame.column(name)? {
            ColumnData::Numerical(values) => values.clone(),
            ColumnData::Categorical(values) => {
                let encoding = encodings.get(name).ok_or_else(|| {
                    MetricError::Configuration {
                        metric: AttributeDisclosure::NAME,
                        detail: format!("no label encoding for column '{name}'"),
                    }
                })?;
                encoding
                    .encode_column(values)?
                    .into_iter()
                    .map(|code| code as f64)
                    .collect()
            }
        };
        columns.push(encoded);
    }

    let rows = frame.rows();
    let mut matrix = Vec::with_capacity(rows);
    for row in 0..rows {
        matrix.push(columns.iter().map(|column| column[row]).collect());
    }
    Ok(matrix)
}

/// Train one attacker for the target column on synthetic rows and score it
/// on the evaluation population.
fn attack_column(
    syn_matrix: &[Vec<f64>],
    eval_matrix: &[Vec<f64>],
    target: usize,
    kind: ColumnKind,
    seed: u64,
    threshold: f64,
) -> Result<ScoreTriple> {
    let syn_x = drop_column(syn_matrix, target);
    let eval_x = drop_column(eval_matrix, target);
    let syn_y: Vec<f64> = syn_matrix.iter().map(|row| row[target]).collect();
    let eval_y: Vec<f64> = eval_matrix.iter().map(|row| row[target]).collect();

    match kind {
        ColumnKind::Categorical => {
            let mut attacker = RandomForest::classifier(seed);
            attacker.fit(&syn_x, &syn_y)?;
            let preds = attacker.predict(&eval_x);
            let y_true: Vec<usize> = eval_y.iter().map(|&code| code.round() as usize).collect();
            let y_pred: Vec<usize> = preds.iter().map(|&code| code.round() as usize).collect();
            Ok(macro_scores(&y_true, &y_pred))
        }
        ColumnKind::Numerical => {
            let mut attacker = RandomForest::regressor(seed);
            attacker.fit(&syn_x, &syn_y)?;
            let preds = attacker.predict(&eval_x);
            // A prediction within the tolerance counts as a successful
            // disclosure; ground truth is the all-ones success label.
            let y_pred: Vec<usize> = preds
                .iter()
                .zip(eval_y.iter())
                .map(|(&pred, &truth)| usize::from((pred - truth).abs() < threshold))
                .collect();
            let y_true = vec![1usize; y_pred.len()];
            Ok(macro_scores(&y_true, &y_pred))
        }
    }
}

fn drop_column(matrix: &[Vec<f64>], target: usize) -> Vec<Vec<f64>> {
    matrix
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|&(idx, _)| idx != target)
                .map(|(_, &value)| value)
                .collect()
        })
        .collect()
}
