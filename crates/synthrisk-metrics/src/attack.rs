//! Attacker models for the attribute disclosure simulation.
//!
//! The adversary is any supervised learner satisfying [`AttackModel`]:
//! fit on label-encoded synthetic predictors, predict on real ones. The
//! default implementation is a seeded random forest (bootstrap-bagged CART
//! trees), classification and regression variants sharing one tree builder.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{MetricError, Result};

/// Minimal supervised-learner contract. Predictors are dense row-major
/// feature matrices; categorical features and targets arrive label-encoded
/// as f64 codes.
pub trait AttackModel {
    fn fit(&mut self, predictors: &[Vec<f64>], targets: &[f64]) -> Result<()>;
    fn predict(&self, predictors: &[Vec<f64>]) -> Vec<f64>;
}

/// Supervised task the attacker solves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackTask {
    Classification,
    Regression,
}

/// Fixed attacker defaults; hyperparameters are not tuned per dataset.
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_leaf: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 16,
            min_leaf: 1,
            seed: 42,
        }
    }
}

/// Derive a stable per-key seed from a base seed (FNV-1a over the key).
pub fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[derive(Debug, Clone)]
enum TreeNode {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf(value) => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

/// Bootstrap-bagged decision forest. Classification trees split on gini
/// impurity and vote by majority; regression trees split on variance and
/// average their leaf means.
#[derive(Debug, Clone)]
pub struct RandomForest {
    task: AttackTask,
    config: ForestConfig,
    trees: Vec<TreeNode>,
}

impl RandomForest {
    pub fn new(task: AttackTask, config: ForestConfig) -> Self {
        Self {
            task,
            config,
            trees: Vec::new(),
        }
    }

    pub fn classifier(seed: u64) -> Self {
        Self::new(
            AttackTask::Classification,
            ForestConfig {
                seed,
                ..ForestConfig::default()
            },
        )
    }

    pub fn regressor(seed: u64) -> Self {
        Self::new(
            AttackTask::Regression,
            ForestConfig {
                seed,
                ..ForestConfig::default()
            },
        )
    }
}

impl AttackModel for RandomForest {
    fn fit(&mut self, predictors: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        if predictors.is_empty() || predictors.len() != targets.len() {
            return Err(MetricError::Configuration {
                metric: "attacker",
                detail: format!(
                    "predictor rows ({}) and targets ({}) must be non-empty and equal",
                    predictors.len(),
                    targets.len()
                ),
            });
        }
        let n_rows = predictors.len();
        let n_features = predictors[0].len();
        if predictors.iter().any(|row| row.len() != n_features) {
            return Err(MetricError::Configuration {
                metric: "attacker",
                detail: "ragged predictor rows".to_string(),
            });
        }

        // sqrt(p) feature subsampling for classification, all features for
        // regression, matching the reference learner's defaults.
        let features_per_split = match self.task {
            AttackTask::Classification => ((n_features as f64).sqrt().round() as usize).max(1),
            AttackTask::Regression => n_features.max(1),
        };

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.trees = (0..self.config.n_trees)
            .map(|_| {
                let sample: Vec<usize> =
                    (0..n_rows).map(|_| rng.random_range(0..n_rows)).collect();
                build_node(
                    predictors,
                    targets,
                    &sample,
                    0,
                    n_features,
                    features_per_split,
                    self.task,
                    &self.config,
                    &mut rng,
                )
            })
            .collect();
        Ok(())
    }

    fn predict(&self, predictors: &[Vec<f64>]) -> Vec<f64> {
        predictors
            .iter()
            .map(|row| {
                let votes: Vec<f64> = self.trees.iter().map(|tree| tree.predict(row)).collect();
                match self.task {
                    AttackTask::Regression => {
                        votes.iter().sum::<f64>() / votes.len().max(1) as f64
                    }
                    AttackTask::Classification => majority(&votes),
                }
            })
            .collect()
    }
}

/// Majority vote over predicted class codes; ties resolve to the smallest
/// code.
fn majority(votes: &[f64]) -> f64 {
    let mut counts: Vec<(i64, usize)> = Vec::new();
    for &vote in votes {
        let code = vote.round() as i64;
        match counts.iter_mut().find(|(c, _)| *c == code) {
            Some((_, count)) => *count += 1,
            None => counts.push((code, 1)),
        }
    }
    counts
        .iter()
        .min_by_key(|&&(code, count)| (std::cmp::Reverse(count), code))
        .map(|&(code, _)| code as f64)
        .unwrap_or(0.0)
}

#[allow(clippy::too_many_arguments)]
fn build_node(
    predictors: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    depth: usize,
    n_features: usize,
    features_per_split: usize,
    task: AttackTask,
    config: &ForestConfig,
    rng: &mut ChaCha8Rng,
) -> TreeNode {
    let first = targets[indices[0]];
    let pure = indices.iter().all(|&i| targets[i] == first);
    if pure
        || depth >= config.max_depth
        || indices.len() < 2 * config.min_leaf.max(1)
        || n_features == 0
    {
        return TreeNode::Leaf(leaf_value(targets, indices, task));
    }

    let candidates = rand::seq::index::sample(
        rng,
        n_features,
        features_per_split.min(n_features),
    );
    let mut best: Option<(f64, usize, f64)> = None;
    for feature in candidates {
        if let Some((score, threshold)) =
            best_split_for_feature(predictors, targets, indices, feature, task, config.min_leaf)
        {
            if best.map_or(true, |(best_score, _, _)| score < best_score) {
                best = Some((score, feature, threshold));
            }
        }
    }

    let Some((_, feature, threshold)) = best else {
        return TreeNode::Leaf(leaf_value(targets, indices, task));
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| predictors[i][feature] <= threshold);
    if left.is_empty() || right.is_empty() {
        return TreeNode::Leaf(leaf_value(targets, indices, task));
    }

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_node(
            predictors,
            targets,
            &left,
            depth + 1,
            n_features,
            features_per_split,
            task,
            config,
            rng,
        )),
        right: Box::new(build_node(
            predictors,
            targets,
            &right,
            depth + 1,
            n_features,
            features_per_split,
            task,
            config,
            rng,
        )),
    }
}

/// Best threshold for one feature: the split minimizing weighted gini
/// (classification) or summed squared error (regression). Returns the
/// criterion value and the midpoint threshold, or None when the feature is
/// constant over the node.
fn best_split_for_feature(
    predictors: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    feature: usize,
    task: AttackTask,
    min_leaf: usize,
) -> Option<(f64, f64)> {
    let mut order: Vec<usize> = indices.to_vec();
    order.sort_by(|&a, &b| {
        predictors[a][feature]
            .partial_cmp(&predictors[b][feature])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let min_leaf = min_leaf.max(1);
    let n = order.len();
    let mut best: Option<(f64, f64)> = None;

    match task {
        AttackTask::Regression => {
            let total_sum: f64 = order.iter().map(|&i| targets[i]).sum();
            let mut left_sum = 0.0;
            let mut left_sumsq = 0.0;
            let total_sumsq: f64 = order.iter().map(|&i| targets[i] * targets[i]).sum();
            for (count, window) in order.windows(2).enumerate() {
                let value = targets[window[0]];
                left_sum += value;
                left_sumsq += value * value;
                let left_n = count + 1;
                let right_n = n - left_n;
                let (a, b) = (
                    predictors[window[0]][feature],
                    predictors[window[1]][feature],
                );
                if a == b || left_n < min_leaf || right_n < min_leaf {
                    continue;
                }
                let right_sum = total_sum - left_sum;
                let right_sumsq = total_sumsq - left_sumsq;
                let sse = (left_sumsq - left_sum * left_sum / left_n as f64)
                    + (right_sumsq - right_sum * right_sum / right_n as f64);
                if best.map_or(true, |(score, _)| sse < score) {
                    best = Some((sse, (a + b) / 2.0));
                }
            }
        }
        AttackTask::Classification => {
            let n_classes = order
                .iter()
                .map(|&i| targets[i].round() as usize)
                .max()
                .unwrap_or(0)
                + 1;
            let mut left_counts = vec![0usize; n_classes];
            let mut right_counts = vec![0usize; n_classes];
            for &i in &order {
                right_counts[targets[i].round() as usize] += 1;
            }
            for (count, window) in order.windows(2).enumerate() {
                let class = targets[window[0]].round() as usize;
                left_counts[class] += 1;
                right_counts[class] -= 1;
                let left_n = count + 1;
                let right_n = n - left_n;
                let (a, b) = (
                    predictors[window[0]][feature],
                    predictors[window[1]][feature],
                );
                if a == b || left_n < min_leaf || right_n < min_leaf {
                    continue;
                }
                let weighted = gini(&left_counts, left_n) * left_n as f64
                    + gini(&right_counts, right_n) * right_n as f64;
                if best.map_or(true, |(score, _)| weighted < score) {
                    best = Some((weighted, (a + b) / 2.0));
                }
            }
        }
    }

    best
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&count| {
            let p = count as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn leaf_value(targets: &[f64], indices: &[usize], task: AttackTask) -> f64 {
    match task {
        AttackTask::Regression => {
            indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
        }
        AttackTask::Classification => {
            let votes: Vec<f64> = indices.iter().map(|&i| targets[i]).collect();
            majority(&votes)
        }
    }
}
