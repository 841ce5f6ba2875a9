//! The immutable DNA descriptor.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use algorhythm_core::{Feature, FeatureVector, FEATURE_COUNT};

use crate::builder::MIN_TRACKS;
use crate::error::{DnaError, DnaResult};
use crate::isolation::{AnomalyModel, IsolationForest};
use crate::linalg::{self, Matrix};
use crate::normalize::{Normalizer, StandardScaler};
use crate::pca::Pca;

/// Per-feature statistics of the raw, un-normalized sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStats {
    pub mean: FeatureVector,
    /// Sample standard deviation (ddof = 1).
    pub std: FeatureVector,
    pub min: FeatureVector,
    pub max: FeatureVector,
}

/// Statistical fingerprint of a track sample.
///
/// Built once by [`crate::build_dna_with`] and never mutated. The three
/// fitted models are pluggable through the [`Normalizer`],
/// [`crate::DimReducer`] and [`crate::AnomalyModel`] capabilities; the
/// defaults are a standard scaler, PCA and an isolation forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnaDescriptor<N = StandardScaler, R = Pca, A = IsolationForest> {
    pub(crate) playlist_name: String,
    pub(crate) track_count: usize,
    pub(crate) feature_order: [Feature; FEATURE_COUNT],
    pub(crate) raw: RawStats,
    pub(crate) normalizer: N,
    pub(crate) mean_vector: FeatureVector,
    pub(crate) covariance: Matrix,
    pub(crate) inverse_covariance: Matrix,
    pub(crate) used_pseudo_inverse: bool,
    pub(crate) anomaly_model: A,
    pub(crate) dim_reducer: R,
    pub(crate) explained_variance: Vec<f64>,
    pub(crate) dims_for_90: usize,
    pub(crate) correlation: Matrix,
    pub(crate) key_distribution: BTreeMap<i32, usize>,
    pub(crate) mode_distribution: BTreeMap<i32, usize>,
}

/// The descriptor with the default model stack.
pub type Dna = DnaDescriptor;

impl<N, R, A> DnaDescriptor<N, R, A> {
    #[must_use]
    pub fn playlist_name(&self) -> &str {
        &self.playlist_name
    }

    #[must_use]
    pub fn track_count(&self) -> usize {
        self.track_count
    }

    #[must_use]
    pub fn feature_order(&self) -> &[Feature; FEATURE_COUNT] {
        &self.feature_order
    }

    #[must_use]
    pub fn raw(&self) -> &RawStats {
        &self.raw
    }

    #[must_use]
    pub fn normalizer(&self) -> &N {
        &self.normalizer
    }

    /// Cluster centre in normalized space.
    #[must_use]
    pub fn mean_vector(&self) -> &FeatureVector {
        &self.mean_vector
    }

    /// Regularized normalized-space covariance.
    #[must_use]
    pub fn covariance(&self) -> &Matrix {
        &self.covariance
    }

    #[must_use]
    pub fn inverse_covariance(&self) -> &Matrix {
        &self.inverse_covariance
    }

    /// Whether the covariance was still singular after regularization.
    #[must_use]
    pub fn used_pseudo_inverse(&self) -> bool {
        self.used_pseudo_inverse
    }

    #[must_use]
    pub fn anomaly_model(&self) -> &A {
        &self.anomaly_model
    }

    #[must_use]
    pub fn dim_reducer(&self) -> &R {
        &self.dim_reducer
    }

    /// Explained-variance ratio per principal component, largest first.
    #[must_use]
    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Leading components needed to explain 90% of the variance.
    #[must_use]
    pub fn dims_for_90(&self) -> usize {
        self.dims_for_90
    }

    /// Normalized-space Pearson correlation.
    #[must_use]
    pub fn correlation(&self) -> &Matrix {
        &self.correlation
    }

    #[must_use]
    pub fn key_distribution(&self) -> &BTreeMap<i32, usize> {
        &self.key_distribution
    }

    #[must_use]
    pub fn mode_distribution(&self) -> &BTreeMap<i32, usize> {
        &self.mode_distribution
    }
}

impl<N: Normalizer, R, A> DnaDescriptor<N, R, A> {
    /// Map a raw vector into this descriptor's normalized space.
    #[must_use]
    pub fn normalize(&self, raw: &FeatureVector) -> FeatureVector {
        self.normalizer.transform(raw)
    }

    /// Mahalanobis distance of a raw vector from the cluster centre.
    #[must_use]
    pub fn mahalanobis(&self, raw: &FeatureVector) -> f64 {
        linalg::mahalanobis(
            &self.normalize(raw),
            &self.mean_vector,
            &self.inverse_covariance,
        )
    }
}

impl<N, R, A> DnaDescriptor<N, R, A>
where
    N: Serialize + DeserializeOwned,
    R: Serialize + DeserializeOwned,
    A: Serialize + DeserializeOwned,
{
    /// Encode as pretty-printed JSON, fitted models included.
    pub fn to_json(&self) -> DnaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and sanity-check a descriptor written by [`Self::to_json`].
    ///
    /// Also rejects descriptors that decode but could not have been fitted,
    /// such as broken tree links or non-finite statistics.
    pub fn from_json(json: &str) -> DnaResult<Self>
    where
        N: Normalizer,
        A: AnomalyModel,
    {
        let descriptor: Self = serde_json::from_str(json)?;
        if descriptor.feature_order != Feature::ALL {
            return Err(DnaError::InvalidDescriptor(format!(
                "unexpected feature order {:?}",
                descriptor.feature_order
            )));
        }
        if descriptor.track_count < MIN_TRACKS {
            return Err(DnaError::InvalidDescriptor(format!(
                "track_count {} is below the minimum of {MIN_TRACKS}",
                descriptor.track_count
            )));
        }
        descriptor.check_finite()?;
        descriptor
            .normalizer
            .validate()
            .map_err(DnaError::InvalidDescriptor)?;
        descriptor
            .anomaly_model
            .validate()
            .map_err(DnaError::InvalidDescriptor)?;
        Ok(descriptor)
    }

    fn check_finite(&self) -> DnaResult<()> {
        let vectors = [
            ("raw mean", &self.raw.mean),
            ("raw std", &self.raw.std),
            ("mean vector", &self.mean_vector),
        ];
        for (name, vector) in vectors {
            if !vector.is_finite() {
                return Err(DnaError::InvalidDescriptor(format!("{name} is not finite")));
            }
        }
        let matrices = [
            ("covariance", &self.covariance),
            ("inverse covariance", &self.inverse_covariance),
        ];
        for (name, matrix) in matrices {
            if matrix.iter().flatten().any(|v| !v.is_finite()) {
                return Err(DnaError::InvalidDescriptor(format!("{name} is not finite")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use algorhythm_core::{AudioFeatures, Track};

    use super::*;
    use crate::builder::build_dna;

    fn tracks() -> Vec<Track> {
        [
            [0.70, 0.80, -5.0, 0.05, 0.10, 0.00, 0.12, 0.60, 120.0],
            [0.65, 0.75, -6.0, 0.04, 0.15, 0.01, 0.20, 0.55, 124.0],
            [0.72, 0.85, -4.5, 0.06, 0.08, 0.00, 0.15, 0.65, 118.0],
            [0.68, 0.78, -5.5, 0.05, 0.12, 0.02, 0.10, 0.58, 122.0],
        ]
        .into_iter()
        .enumerate()
        .map(|(i, values)| {
            Track::new(
                format!("t{i}"),
                format!("Song {i}"),
                "Artist",
                AudioFeatures::from(FeatureVector::new(values)).with_key_mode(i as i32 % 2, 1),
            )
        })
        .collect()
    }

    #[test]
    fn test_json_round_trip_keeps_fitted_models() {
        let dna = build_dna(&tracks(), "Road Trip").unwrap();
        let json = dna.to_json().unwrap();
        let back = Dna::from_json(&json).unwrap();

        assert_eq!(back.playlist_name(), "Road Trip");
        assert_eq!(back.track_count(), 4);
        assert_eq!(back.key_distribution(), dna.key_distribution());

        let probe = FeatureVector::new([0.5, 0.5, -9.0, 0.1, 0.3, 0.1, 0.2, 0.4, 100.0]);
        let (a, b) = (back.normalize(&probe), dna.normalize(&probe));
        assert!(a.distance(&b) < 1e-12);
        let (a, b) = (back.mahalanobis(&probe), dna.mahalanobis(&probe));
        assert!((a - b).abs() <= 1e-6 * b.abs().max(1.0));
    }

    #[test]
    fn test_from_json_rejects_reordered_features() {
        let dna = build_dna(&tracks(), "Road Trip").unwrap();
        let json = dna.to_json().unwrap().replacen("\"danceability\"", "\"energy\"", 1);
        assert!(matches!(
            Dna::from_json(&json),
            Err(DnaError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_dangling_tree_link() {
        let dna = build_dna(&tracks(), "Road Trip").unwrap();
        let json = dna.to_json().unwrap();
        let at = json.find("\"left\": ").unwrap() + "\"left\": ".len();
        let corrupted = format!("{}99999{}", &json[..at], &json[at..]);

        let err = Dna::from_json(&corrupted).unwrap_err();
        assert!(matches!(err, DnaError::InvalidDescriptor(_)), "{err}");
    }

    #[test]
    fn test_from_json_rejects_self_referencing_tree_link() {
        let dna = build_dna(&tracks(), "Road Trip").unwrap();
        let json = dna.to_json().unwrap();
        let at = json.find("\"left\": ").unwrap() + "\"left\": ".len();
        let end = at + json[at..].find(|c: char| !c.is_ascii_digit()).unwrap();
        let corrupted = format!("{}0{}", &json[..at], &json[end..]);

        assert!(matches!(
            Dna::from_json(&corrupted),
            Err(DnaError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_non_finite_statistics_are_invalid() {
        let mut dna = build_dna(&tracks(), "Road Trip").unwrap();
        assert!(dna.check_finite().is_ok());

        dna.inverse_covariance[2][3] = f64::NAN;
        assert!(matches!(
            dna.check_finite(),
            Err(DnaError::InvalidDescriptor(msg)) if msg == "inverse covariance is not finite"
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Dna::from_json("{\"playlist_name\": 3}"),
            Err(DnaError::Serialization(_))
        ));
    }
}
