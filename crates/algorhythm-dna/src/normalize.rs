//! Feature normalization.

use serde::{Deserialize, Serialize};

use algorhythm_core::{FeatureVector, FEATURE_COUNT};

use crate::linalg::{column_means, column_std};

/// A normalization transform fitted once on a sample and reusable on any
/// later vector.
pub trait Normalizer {
    /// Fit the transform on `samples`.
    fn fit(samples: &[FeatureVector]) -> Self
    where
        Self: Sized;

    /// Apply the fitted transform.
    fn transform(&self, sample: &FeatureVector) -> FeatureVector;

    /// Check the parameters of a transform decoded from storage.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Standardizes each feature to zero mean and unit variance.
///
/// Uses the population standard deviation. A feature that is constant
/// across the sample keeps a unit scale, so it is only centred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: FeatureVector,
    scale: FeatureVector,
}

impl StandardScaler {
    #[must_use]
    pub fn mean(&self) -> &FeatureVector {
        &self.mean
    }

    #[must_use]
    pub fn scale(&self) -> &FeatureVector {
        &self.scale
    }
}

impl Normalizer for StandardScaler {
    fn fit(samples: &[FeatureVector]) -> Self {
        let mean = column_means(samples);
        let std = column_std(samples, 0);
        let mut scale = [1.0; FEATURE_COUNT];
        for (s, &sd) in scale.iter_mut().zip(std.as_array()) {
            if sd >= 10.0 * f64::EPSILON {
                *s = sd;
            }
        }
        Self {
            mean,
            scale: FeatureVector::new(scale),
        }
    }

    fn transform(&self, sample: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for (j, value) in out.iter_mut().enumerate() {
            *value = (sample.as_array()[j] - self.mean.as_array()[j]) / self.scale.as_array()[j];
        }
        FeatureVector::new(out)
    }

    fn validate(&self) -> Result<(), String> {
        if !self.mean.is_finite() {
            return Err("scaler mean is not finite".to_string());
        }
        if let Some((feature, value)) = self
            .scale
            .iter()
            .find(|(_, value)| !value.is_finite() || *value <= 0.0)
        {
            return Err(format!("scaler has an invalid {feature} scale {value}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<FeatureVector> {
        vec![
            FeatureVector::new([0.2, 0.5, -10.0, 0.1, 0.4, 0.0, 0.1, 0.3, 90.0]),
            FeatureVector::new([0.4, 0.5, -6.0, 0.1, 0.2, 0.0, 0.2, 0.5, 110.0]),
            FeatureVector::new([0.6, 0.5, -8.0, 0.1, 0.3, 0.0, 0.3, 0.7, 130.0]),
        ]
    }

    #[test]
    fn test_transformed_sample_is_standardized() {
        let rows = sample();
        let scaler = StandardScaler::fit(&rows);
        let normalized: Vec<FeatureVector> = rows.iter().map(|r| scaler.transform(r)).collect();

        let mean = column_means(&normalized);
        let std = column_std(&normalized, 0);
        for j in 0..FEATURE_COUNT {
            assert!(mean.as_array()[j].abs() < 1e-12);
        }
        // Non-constant features reach unit population variance.
        assert!((std.as_array()[0] - 1.0).abs() < 1e-12);
        assert!((std.as_array()[8] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_feature_keeps_unit_scale() {
        let scaler = StandardScaler::fit(&sample());
        assert_eq!(scaler.scale().as_array()[1], 1.0);
        assert_eq!(scaler.scale().as_array()[5], 1.0);

        let probe = FeatureVector::new([0.4, 0.9, -8.0, 0.1, 0.3, 0.0, 0.2, 0.5, 110.0]);
        let out = scaler.transform(&probe);
        assert!((out.as_array()[1] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_transform_reuses_fitted_parameters() {
        let scaler = StandardScaler::fit(&sample());
        let sd = (800.0_f64 / 3.0).sqrt();
        let probe = FeatureVector::new([0.4, 0.5, -8.0, 0.1, 0.3, 0.0, 0.2, 0.5, 150.0]);
        let out = scaler.transform(&probe);
        assert!((out.as_array()[8] - 40.0 / sd).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_zero_scale() {
        let scaler = StandardScaler::fit(&sample());
        assert_eq!(scaler.validate(), Ok(()));

        let broken = StandardScaler {
            mean: scaler.mean,
            scale: scaler.scale.with(algorhythm_core::Feature::Tempo, 0.0),
        };
        assert!(broken.validate().unwrap_err().contains("tempo"));
    }
}
