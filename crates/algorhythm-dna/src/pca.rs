//! Principal component analysis over the feature space.

use serde::{Deserialize, Serialize};

use algorhythm_core::{FeatureVector, FEATURE_COUNT};

use crate::linalg::{column_means, covariance, symmetric_eigen};

/// Total variance below which a sample is treated as a single point.
const DEGENERATE_VARIANCE: f64 = 1e-12;

/// An orthogonal dimensionality reduction fitted on a sample.
pub trait DimReducer {
    /// Fit at most `n_components` orthogonal components.
    fn fit(samples: &[FeatureVector], n_components: usize) -> Self
    where
        Self: Sized;

    /// Fraction of total variance carried by each kept component, largest first.
    fn explained_variance_ratio(&self) -> &[f64];

    /// Coordinates of `sample` along the kept components.
    fn project(&self, sample: &FeatureVector) -> Vec<f64>;
}

/// PCA by eigen-decomposition of the sample covariance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pca {
    mean: FeatureVector,
    components: Vec<FeatureVector>,
    explained_variance: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
}

impl Pca {
    /// Principal axes, largest variance first.
    #[must_use]
    pub fn components(&self) -> &[FeatureVector] {
        &self.components
    }

    /// Variance along each principal axis.
    #[must_use]
    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }
}

impl DimReducer for Pca {
    fn fit(samples: &[FeatureVector], n_components: usize) -> Self {
        let n_components = n_components.min(FEATURE_COUNT);
        let mean = column_means(samples);
        let cov = covariance(samples);
        let total: f64 = (0..FEATURE_COUNT).map(|i| cov[i][i]).sum();
        let eigen = symmetric_eigen(&cov);

        let explained_variance: Vec<f64> = eigen
            .values
            .iter()
            .take(n_components)
            .map(|v| v.max(0.0))
            .collect();
        let explained_variance_ratio = if total > DEGENERATE_VARIANCE {
            explained_variance.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; explained_variance.len()]
        };
        let components = eigen
            .vectors
            .iter()
            .take(n_components)
            .map(|v| FeatureVector::new(*v))
            .collect();

        Self {
            mean,
            components,
            explained_variance,
            explained_variance_ratio,
        }
    }

    fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    fn project(&self, sample: &FeatureVector) -> Vec<f64> {
        let mut centered = [0.0; FEATURE_COUNT];
        for (j, c) in centered.iter_mut().enumerate() {
            *c = sample.as_array()[j] - self.mean.as_array()[j];
        }
        let centered = FeatureVector::new(centered);
        self.components.iter().map(|axis| axis.dot(&centered)).collect()
    }
}

/// Smallest number of leading components whose cumulative explained
/// variance reaches `target`.
///
/// A degenerate sample (all ratios zero) needs a single dimension. The
/// count never exceeds the number of components.
#[must_use]
pub fn dims_for_variance(ratios: &[f64], target: f64) -> usize {
    if ratios.iter().all(|r| *r <= 0.0) {
        return 1;
    }
    let mut cumulative = 0.0;
    for (i, ratio) in ratios.iter().enumerate() {
        cumulative += ratio;
        if cumulative >= target {
            return i + 1;
        }
    }
    ratios.len().max(1)
}
