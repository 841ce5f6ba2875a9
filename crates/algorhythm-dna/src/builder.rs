//! DNA builder: fits the statistical descriptor of a track sample.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use algorhythm_core::{Feature, FeatureVector, Track, FEATURE_COUNT};

use crate::descriptor::{Dna, DnaDescriptor, RawStats};
use crate::error::{DnaError, DnaResult};
use crate::isolation::{AnomalyModel, IsolationForest, IsolationParams};
use crate::linalg::{
    column_bounds, column_means, column_std, correlation, covariance, invert, pseudo_inverse,
    regularize,
};
use crate::normalize::{Normalizer, StandardScaler};
use crate::pca::{dims_for_variance, DimReducer, Pca};

/// Smallest sample a descriptor can be fitted on.
pub const MIN_TRACKS: usize = 3;

/// Ridge added to the covariance diagonal before inversion.
pub const COVARIANCE_EPSILON: f64 = 1e-6;

/// Cumulative explained variance that `dims_for_90` targets.
pub const VARIANCE_TARGET: f64 = 0.90;

/// Build a descriptor with the default scaler, PCA and isolation forest.
pub fn build_dna(tracks: &[Track], playlist_name: &str) -> DnaResult<Dna> {
    build_dna_with::<StandardScaler, Pca, IsolationForest>(
        tracks,
        playlist_name,
        &IsolationParams::default(),
    )
}

/// Build a descriptor with caller-chosen model implementations.
///
/// The result is a pure function of `tracks` and `anomaly_params`.
pub fn build_dna_with<N, R, A>(
    tracks: &[Track],
    playlist_name: &str,
    anomaly_params: &A::Params,
) -> DnaResult<DnaDescriptor<N, R, A>>
where
    N: Normalizer,
    R: DimReducer,
    A: AnomalyModel,
{
    if tracks.len() < MIN_TRACKS {
        return Err(DnaError::InsufficientSamples {
            count: tracks.len(),
            required: MIN_TRACKS,
        });
    }

    let raw: Vec<FeatureVector> = tracks.iter().map(Track::vector).collect();
    check_finite(&raw)?;

    let (min, max) = column_bounds(&raw);
    let stats = RawStats {
        mean: column_means(&raw),
        std: column_std(&raw, 1),
        min,
        max,
    };

    let normalizer = N::fit(&raw);
    let normalized: Vec<FeatureVector> = raw.iter().map(|v| normalizer.transform(v)).collect();
    let mean_vector = column_means(&normalized);

    let sample_covariance = covariance(&normalized);
    let regularized = regularize(&sample_covariance, COVARIANCE_EPSILON);
    let (inverse_covariance, used_pseudo_inverse) = match invert(&regularized) {
        Some(inverse) => (inverse, false),
        None => {
            warn!("covariance for '{playlist_name}' is near-singular, using pseudo-inverse");
            (pseudo_inverse(&regularized), true)
        }
    };

    let anomaly_model = A::fit(&normalized, anomaly_params);

    let n_components = FEATURE_COUNT.min(tracks.len() - 1);
    let dim_reducer = R::fit(&normalized, n_components);
    let explained_variance = dim_reducer.explained_variance_ratio().to_vec();
    let dims_for_90 = dims_for_variance(&explained_variance, VARIANCE_TARGET);
    debug!("explained variance ratios: {explained_variance:?}");

    let descriptor = DnaDescriptor {
        playlist_name: playlist_name.to_string(),
        track_count: tracks.len(),
        feature_order: Feature::ALL,
        raw: stats,
        normalizer,
        mean_vector,
        covariance: regularized,
        inverse_covariance,
        used_pseudo_inverse,
        anomaly_model,
        dim_reducer,
        explained_variance,
        dims_for_90,
        correlation: correlation(&sample_covariance),
        key_distribution: tally(tracks.iter().filter_map(|t| t.features.key)),
        mode_distribution: tally(tracks.iter().filter_map(|t| t.features.mode)),
    };

    info!(
        "DNA built for '{}' from {} tracks ({} dims for 90% variance)",
        descriptor.playlist_name, descriptor.track_count, descriptor.dims_for_90
    );
    Ok(descriptor)
}

fn check_finite(rows: &[FeatureVector]) -> DnaResult<()> {
    for (index, row) in rows.iter().enumerate() {
        if let Some((feature, _)) = row.iter().find(|(_, value)| !value.is_finite()) {
            return Err(DnaError::NonFiniteFeature {
                position: index + 1,
                feature,
            });
        }
    }
    Ok(())
}

fn tally(values: impl Iterator<Item = i32>) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use algorhythm_core::AudioFeatures;

    use super::*;

    fn track(i: usize, values: [f64; FEATURE_COUNT]) -> Track {
        Track::new(
            format!("t{i}"),
            format!("Song {i}"),
            "Artist",
            AudioFeatures::from(FeatureVector::new(values)),
        )
    }

    fn varied() -> Vec<Track> {
        vec![
            track(1, [0.70, 0.80, -5.0, 0.05, 0.10, 0.00, 0.12, 0.60, 120.0]),
            track(2, [0.65, 0.75, -6.0, 0.04, 0.15, 0.01, 0.20, 0.55, 124.0]),
            track(3, [0.72, 0.85, -4.5, 0.06, 0.08, 0.00, 0.15, 0.65, 118.0]),
            track(4, [0.68, 0.78, -5.5, 0.05, 0.12, 0.02, 0.10, 0.58, 122.0]),
            track(5, [0.60, 0.70, -7.0, 0.03, 0.20, 0.00, 0.18, 0.50, 128.0]),
        ]
    }

    /// Leaves vectors untouched.
    #[derive(Debug, PartialEq)]
    struct Identity;

    impl Normalizer for Identity {
        fn fit(_: &[FeatureVector]) -> Self {
            Identity
        }

        fn transform(&self, sample: &FeatureVector) -> FeatureVector {
            *sample
        }
    }

    /// Reports a fixed spectrum regardless of the data.
    #[derive(Debug, PartialEq)]
    struct FixedSpectrum(Vec<f64>);

    impl DimReducer for FixedSpectrum {
        fn fit(_: &[FeatureVector], n_components: usize) -> Self {
            let ratios = [0.5, 0.3, 0.15, 0.05];
            FixedSpectrum(ratios.into_iter().take(n_components).collect())
        }

        fn explained_variance_ratio(&self) -> &[f64] {
            &self.0
        }

        fn project(&self, _: &FeatureVector) -> Vec<f64> {
            vec![0.0; self.0.len()]
        }
    }

    /// Remembers how many samples it was fitted on.
    #[derive(Debug, PartialEq)]
    struct Counting {
        fitted_on: usize,
        bias: f64,
    }

    impl AnomalyModel for Counting {
        type Params = f64;

        fn fit(samples: &[FeatureVector], bias: &f64) -> Self {
            Counting {
                fitted_on: samples.len(),
                bias: *bias,
            }
        }

        fn score(&self, _: &FeatureVector) -> f64 {
            self.bias
        }
    }

    #[test]
    fn test_rejects_fewer_than_three_tracks() {
        let tracks = varied();
        let err = build_dna(&tracks[..2], "tiny").unwrap_err();
        assert!(matches!(
            err,
            DnaError::InsufficientSamples {
                count: 2,
                required: 3
            }
        ));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let mut tracks = varied();
        tracks[1].features.tempo = f64::NAN;
        let err = build_dna(&tracks, "broken").unwrap_err();
        assert!(matches!(
            err,
            DnaError::NonFiniteFeature {
                position: 2,
                feature: Feature::Tempo
            }
        ));
    }

    #[test]
    fn test_raw_stats() {
        let dna = build_dna(&varied(), "Drive").unwrap();
        let raw = dna.raw();
        assert!((raw.mean[Feature::Tempo] - 122.4).abs() < 1e-9);
        assert_eq!(raw.min[Feature::Tempo], 118.0);
        assert_eq!(raw.max[Feature::Tempo], 128.0);
        // Sample std of 120, 124, 118, 122, 128.
        let expected = (59.2_f64 / 4.0).sqrt();
        assert!((raw.std[Feature::Tempo] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_centre_is_origin() {
        let dna = build_dna(&varied(), "Drive").unwrap();
        for (_, value) in dna.mean_vector().iter() {
            assert!(value.abs() < 1e-12);
        }
        assert_eq!(dna.explained_variance().len(), 4);
        assert!(dna.dims_for_90() >= 1 && dna.dims_for_90() <= 4);
    }

    #[test]
    fn test_identical_tracks_fall_back_cleanly() {
        let values = [0.5, 0.6, -7.0, 0.05, 0.2, 0.0, 0.1, 0.5, 110.0];
        let tracks: Vec<Track> = (0..3).map(|i| track(i, values)).collect();
        let dna = build_dna(&tracks, "Loop").unwrap();

        assert_eq!(dna.track_count(), 3);
        assert_eq!(dna.dims_for_90(), 1);
        for (_, std) in dna.raw().std.iter() {
            assert_eq!(std, 0.0);
        }
        assert!(dna.mahalanobis(&FeatureVector::new(values)) < 1e-9);
    }

    #[test]
    fn test_categorical_distributions() {
        let mut tracks = varied();
        tracks[0].features = tracks[0].features.clone().with_key_mode(5, 1);
        tracks[1].features = tracks[1].features.clone().with_key_mode(5, 0);
        tracks[2].features = tracks[2].features.clone().with_key_mode(7, 1);

        let dna = build_dna(&tracks, "Keys").unwrap();
        assert_eq!(dna.key_distribution().get(&5), Some(&2));
        assert_eq!(dna.key_distribution().get(&7), Some(&1));
        assert_eq!(dna.mode_distribution().get(&1), Some(&2));

        let plain = build_dna(&varied(), "No keys").unwrap();
        assert!(plain.key_distribution().is_empty());
        assert!(plain.mode_distribution().is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build_dna(&varied(), "Drive").unwrap();
        let b = build_dna(&varied(), "Drive").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stand_in_models() {
        let dna = build_dna_with::<Identity, FixedSpectrum, Counting>(&varied(), "Stub", &-0.4)
            .unwrap();

        assert_eq!(dna.normalizer(), &Identity);
        assert_eq!(dna.anomaly_model().fitted_on, 5);
        assert_eq!(dna.explained_variance(), &[0.5, 0.3, 0.15, 0.05]);
        assert_eq!(dna.dims_for_90(), 3);
        // Identity normalization leaves the centre at the raw mean.
        assert!((dna.mean_vector()[Feature::Tempo] - 122.4).abs() < 1e-9);
    }
}
