//! Isolation forest anomaly model.
//!
//! Each tree recursively partitions a random subsample with random
//! axis-aligned cuts; points that are isolated after few cuts are
//! anomalous. Scores follow the usual convention: `-2^(-E[h(x)] / c(ψ))`,
//! so inliers sit near `-0.5` and outliers approach `-1`.

use rand::rngs::StdRng;
use rand::seq::index::sample as sample_indices;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use algorhythm_core::{Feature, FeatureVector};

/// Euler–Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Largest subsample drawn per tree.
const MAX_SUBSAMPLE: usize = 256;

/// An anomaly model fitted on a sample.
pub trait AnomalyModel {
    type Params;

    fn fit(samples: &[FeatureVector], params: &Self::Params) -> Self
    where
        Self: Sized;

    /// Raw normality score; lower means more anomalous.
    fn score(&self, sample: &FeatureVector) -> f64;

    /// Check the structure of a model decoded from storage.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Isolation forest hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsolationParams {
    /// Expected fraction of outliers; sets the decision offset.
    pub contamination: f64,
    pub n_estimators: usize,
    pub seed: u64,
}

impl Default for IsolationParams {
    fn default() -> Self {
        Self {
            contamination: 0.10,
            n_estimators: 100,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: Feature,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// One isolation tree, stored as an arena with the root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow(rows: &[&FeatureVector], max_depth: usize, rng: &mut StdRng) -> Self {
        let mut nodes = Vec::new();
        grow_node(rows, 0, max_depth, rng, &mut nodes);
        Self { nodes }
    }

    /// Non-empty, finite thresholds, and every child after its parent and
    /// inside the arena, so a walk from the root always terminates.
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty isolation tree".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                threshold,
                left,
                right,
                ..
            } = node
            {
                if !threshold.is_finite() {
                    return Err(format!("node {index} has a non-finite threshold"));
                }
                for child in [*left, *right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(format!(
                            "node {index} points to child {child} (nodes: {})",
                            self.nodes.len()
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn path_length(&self, sample: &FeatureVector) -> f64 {
        let mut index = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    depth += 1.0;
                    index = if sample.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

fn grow_node(
    rows: &[&FeatureVector],
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
    nodes: &mut Vec<Node>,
) -> usize {
    let id = nodes.len();
    nodes.push(Node::Leaf { size: rows.len() });
    if depth >= max_depth || rows.len() <= 1 {
        return id;
    }

    let splittable: Vec<(Feature, f64, f64)> = Feature::ALL
        .into_iter()
        .filter_map(|feature| {
            let (lo, hi) = rows.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), row| (lo.min(row.get(feature)), hi.max(row.get(feature))),
            );
            (hi > lo).then_some((feature, lo, hi))
        })
        .collect();
    if splittable.is_empty() {
        return id;
    }

    let (feature, lo, hi) = splittable[rng.random_range(0..splittable.len())];
    let threshold = rng.random_range(lo..hi);
    let (left_rows, right_rows): (Vec<&FeatureVector>, Vec<&FeatureVector>) = rows
        .iter()
        .copied()
        .partition(|row| row.get(feature) <= threshold);

    let left = grow_node(&left_rows, depth + 1, max_depth, rng, nodes);
    let right = grow_node(&right_rows, depth + 1, max_depth, rng, nodes);
    nodes[id] = Node::Split {
        feature,
        threshold,
        left,
        right,
    };
    id
}

/// Average path length of an unsuccessful binary-search-tree lookup among
/// `n` points, used to normalise tree depths.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolated percentile (`q` in 0..=100) of unsorted values.
fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// A fitted isolation forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    params: IsolationParams,
    max_samples: usize,
    trees: Vec<IsolationTree>,
    /// Training-score percentile at the contamination fraction.
    offset: f64,
}

impl IsolationForest {
    #[must_use]
    pub fn params(&self) -> &IsolationParams {
        &self.params
    }

    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Score shifted so that negative values are outliers.
    #[must_use]
    pub fn decision_function(&self, sample: &FeatureVector) -> f64 {
        self.score(sample) - self.offset
    }

    #[must_use]
    pub fn is_outlier(&self, sample: &FeatureVector) -> bool {
        self.decision_function(sample) < 0.0
    }

    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl AnomalyModel for IsolationForest {
    type Params = IsolationParams;

    fn fit(samples: &[FeatureVector], params: &IsolationParams) -> Self {
        let max_samples = samples.len().min(MAX_SUBSAMPLE);
        let max_depth = (max_samples.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut trees = Vec::with_capacity(params.n_estimators);
        for _ in 0..params.n_estimators {
            let subsample: Vec<&FeatureVector> =
                sample_indices(&mut rng, samples.len(), max_samples)
                    .iter()
                    .map(|i| &samples[i])
                    .collect();
            trees.push(IsolationTree::grow(&subsample, max_depth, &mut rng));
        }

        let mut forest = Self {
            params: *params,
            max_samples,
            trees,
            offset: 0.0,
        };
        let training_scores: Vec<f64> = samples.iter().map(|s| forest.score(s)).collect();
        forest.offset = percentile(&training_scores, 100.0 * params.contamination);
        forest
    }

    fn score(&self, sample: &FeatureVector) -> f64 {
        let normaliser = average_path_length(self.max_samples);
        if self.trees.is_empty() || normaliser <= 0.0 {
            return -0.5;
        }
        let mean_depth = self
            .trees
            .iter()
            .map(|tree| tree.path_length(sample))
            .sum::<f64>()
            / self.trees.len() as f64;
        -(2.0_f64.powf(-mean_depth / normaliser))
    }

    fn validate(&self) -> Result<(), String> {
        if !self.offset.is_finite() {
            return Err("isolation forest offset is not finite".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }
}
