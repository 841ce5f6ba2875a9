//! Cohesion and conviction report.
//!
//! A read-only summary of how distinctive a playlist is, derived from a
//! built descriptor and the reference tables in [`Tuning`]. Per feature:
//!
//! - *tightness* is 1 when the sample never varies and 0 once its standard
//!   deviation reaches a third of the feature's natural range;
//! - *identity* measures how far the sample mean sits from the baseline of
//!   typical music;
//! - *conviction* is the larger of the two.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use algorhythm_core::{round_to, Feature, Tuning, FEATURE_COUNT};

use crate::descriptor::DnaDescriptor;

/// Absolute correlation above which a feature pair is reported.
const CORRELATION_THRESHOLD: f64 = 0.3;
const MAX_CORRELATED_PAIRS: usize = 6;

/// Relative deviation from baseline above which a feature is a dominant trait.
const TRAIT_THRESHOLD: f64 = 0.15;
const MAX_DOMINANT_TRAITS: usize = 5;

/// Identity reaches 1 once the mean is 40% of the natural range from baseline.
const IDENTITY_GAIN: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProfile {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conviction {
    pub feature: Feature,
    pub tightness: f64,
    pub identity: f64,
    pub conviction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaSummary {
    pub dims_for_90pct: usize,
    pub total_dims: usize,
    pub top3_explained_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Inverse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPair {
    pub feature_a: Feature,
    pub feature_b: Feature,
    pub correlation: f64,
    pub direction: CorrelationDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitDirection {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantTrait {
    pub feature: Feature,
    pub direction: TraitDirection,
    /// Sample mean, rounded to 4 decimals.
    pub value: f64,
    pub deviation_pct: f64,
}

/// Human-facing summary of a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohesionReport {
    pub playlist_name: String,
    pub track_count: usize,
    pub feature_profile: BTreeMap<Feature, FeatureProfile>,
    /// Mean conviction scaled to 0-100.
    pub cohesion_score: f64,
    pub conviction_breakdown: Vec<Conviction>,
    pub pca_breakdown: PcaSummary,
    pub correlated_features: Vec<CorrelatedPair>,
    pub dominant_traits: Vec<DominantTrait>,
    pub key_distribution: BTreeMap<i32, usize>,
    pub mode_distribution: BTreeMap<i32, usize>,
}

/// Derive the cohesion report of `dna`.
#[must_use]
pub fn cohesion_report<N, R, A>(dna: &DnaDescriptor<N, R, A>, tuning: &Tuning) -> CohesionReport {
    let feature_profile = feature_profile(dna);
    let conviction_breakdown = convictions(dna, tuning);
    let mean_conviction = conviction_breakdown
        .iter()
        .map(|c| c.conviction)
        .sum::<f64>()
        / FEATURE_COUNT as f64;

    let top3: f64 = dna.explained_variance().iter().take(3).sum();

    CohesionReport {
        playlist_name: dna.playlist_name().to_string(),
        track_count: dna.track_count(),
        dominant_traits: dominant_traits(&feature_profile, tuning),
        feature_profile,
        cohesion_score: round_to(mean_conviction * 100.0, 1),
        conviction_breakdown,
        pca_breakdown: PcaSummary {
            dims_for_90pct: dna.dims_for_90(),
            total_dims: FEATURE_COUNT,
            top3_explained_pct: round_to(top3 * 100.0, 1),
        },
        correlated_features: correlated_pairs(dna),
        key_distribution: dna.key_distribution().clone(),
        mode_distribution: dna.mode_distribution().clone(),
    }
}

fn feature_profile<N, R, A>(dna: &DnaDescriptor<N, R, A>) -> BTreeMap<Feature, FeatureProfile> {
    let raw = dna.raw();
    Feature::ALL
        .into_iter()
        .map(|f| {
            let profile = FeatureProfile {
                mean: round_to(raw.mean[f], 4),
                std: round_to(raw.std[f], 4),
                min: round_to(raw.min[f], 4),
                max: round_to(raw.max[f], 4),
                range: round_to(raw.max[f] - raw.min[f], 4),
            };
            (f, profile)
        })
        .collect()
}

fn convictions<N, R, A>(dna: &DnaDescriptor<N, R, A>, tuning: &Tuning) -> Vec<Conviction> {
    let raw = dna.raw();
    Feature::ALL
        .into_iter()
        .map(|f| {
            let natural_range = tuning.natural_range(f);
            let tightness = (1.0 - 3.0 * raw.std[f] / natural_range).max(0.0);
            let identity =
                ((raw.mean[f] - tuning.baseline(f)).abs() / natural_range * IDENTITY_GAIN).min(1.0);
            Conviction {
                feature: f,
                tightness: round_to(tightness, 3),
                identity: round_to(identity, 3),
                conviction: round_to(tightness.max(identity), 3),
            }
        })
        .collect()
}

fn correlated_pairs<N, R, A>(dna: &DnaDescriptor<N, R, A>) -> Vec<CorrelatedPair> {
    let corr = dna.correlation();
    let mut pairs = Vec::new();
    for (i, a) in Feature::ALL.into_iter().enumerate() {
        for (j, b) in Feature::ALL.into_iter().enumerate().skip(i + 1) {
            let r = corr[i][j];
            if r.abs() > CORRELATION_THRESHOLD {
                pairs.push(CorrelatedPair {
                    feature_a: a,
                    feature_b: b,
                    correlation: round_to(r, 3),
                    direction: if r > 0.0 {
                        CorrelationDirection::Positive
                    } else {
                        CorrelationDirection::Inverse
                    },
                });
            }
        }
    }
    pairs.sort_by(|x, y| y.correlation.abs().total_cmp(&x.correlation.abs()));
    pairs.truncate(MAX_CORRELATED_PAIRS);
    pairs
}

fn dominant_traits(profile: &BTreeMap<Feature, FeatureProfile>, tuning: &Tuning) -> Vec<DominantTrait> {
    let mut traits: Vec<DominantTrait> = profile
        .iter()
        .filter_map(|(&feature, stats)| {
            let baseline = tuning.baseline(feature);
            if baseline == 0.0 {
                return None;
            }
            // Loudness is negative, so its deviation is measured against |baseline|.
            let deviation = if feature == Feature::Loudness {
                (baseline - stats.mean) / baseline.abs()
            } else {
                (stats.mean - baseline) / baseline
            };
            (deviation.abs() > TRAIT_THRESHOLD).then(|| DominantTrait {
                feature,
                direction: if deviation > 0.0 {
                    TraitDirection::High
                } else {
                    TraitDirection::Low
                },
                value: stats.mean,
                deviation_pct: round_to(deviation * 100.0, 1),
            })
        })
        .collect();
    traits.sort_by(|x, y| y.deviation_pct.abs().total_cmp(&x.deviation_pct.abs()));
    traits.truncate(MAX_DOMINANT_TRAITS);
    traits
}
