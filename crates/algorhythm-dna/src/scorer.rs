//! Scores a candidate track against a DNA descriptor.
//!
//! Three independent metrics are blended with fixed weights:
//!
//! - cosine similarity of the raw vector to the raw sample mean,
//! - a chi-squared-scaled Mahalanobis fit in normalized space,
//! - the anomaly model's score rescaled to `[0, 1]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use algorhythm_core::{round_to, FeatureVector, Track, FEATURE_COUNT};

use crate::descriptor::DnaDescriptor;
use crate::error::{DnaError, DnaResult};
use crate::isolation::AnomalyModel;
use crate::normalize::Normalizer;

/// Composite at or above which a candidate should be added.
pub const ADD_THRESHOLD: f64 = 0.60;

/// Composite at or above which a candidate is borderline.
pub const MAYBE_THRESHOLD: f64 = 0.40;

/// Raw anomaly scores mapped onto 0 and 1 respectively.
const ANOMALY_FLOOR: f64 = -0.70;
const ANOMALY_CEILING: f64 = -0.30;

/// Blend weights of the three metrics; they sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub cosine: f64,
    pub mahalanobis: f64,
    pub isolation: f64,
}

pub const WEIGHTS: Weights = Weights {
    cosine: 0.30,
    mahalanobis: 0.45,
    isolation: 0.25,
};

/// Add/maybe/reject recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Add,
    Maybe,
    Reject,
}

impl Verdict {
    /// Classify a composite score. Boundary values belong to the higher band.
    #[must_use]
    pub fn from_composite(composite: f64) -> Self {
        if composite >= ADD_THRESHOLD {
            Self::Add
        } else if composite >= MAYBE_THRESHOLD {
            Self::Maybe
        } else {
            Self::Reject
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "ADD",
            Self::Maybe => "MAYBE",
            Self::Reject => "REJECT",
        })
    }
}

/// The four scores of a candidate, each in `[0, 1]` and rounded to 4 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub cosine_similarity: f64,
    pub mahalanobis_fit: f64,
    pub isolation_forest: f64,
    pub composite: f64,
}

/// Scores plus the labels needed to present them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub song: String,
    pub artist: String,
    pub playlist: String,
    pub scores: Scores,
    pub weights: Weights,
    pub verdict: Verdict,
}

/// Cosine similarity, or 0 when either vector has zero length.
///
/// Both vectors are divided by their largest magnitude first so that the
/// norms cannot overflow.
#[must_use]
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let (Some(a), Some(b)) = (unit_scaled(a), unit_scaled(b)) else {
        return 0.0;
    };
    let similarity = a.dot(&b) / (a.norm() * b.norm());
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

fn unit_scaled(v: &FeatureVector) -> Option<FeatureVector> {
    let largest = v.as_array().iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    if largest == 0.0 || !largest.is_finite() {
        return None;
    }
    let mut values = *v.as_array();
    for value in &mut values {
        *value /= largest;
    }
    Some(FeatureVector::new(values))
}

/// `exp(-d² / 2D)`: a distance of `√D` maps to about 0.6, zero to 1.
#[must_use]
pub fn mahalanobis_score(distance: f64) -> f64 {
    (-(distance * distance) / (2.0 * FEATURE_COUNT as f64)).exp()
}

/// Linear rescale of a raw anomaly score from `[-0.70, -0.30]` to `[0, 1]`.
#[must_use]
pub fn anomaly_score(raw: f64) -> f64 {
    ((raw - ANOMALY_FLOOR) / (ANOMALY_CEILING - ANOMALY_FLOOR)).clamp(0.0, 1.0) + 0.0
}

/// Score a raw feature vector against `dna`.
pub fn score_vector<N, R, A>(candidate: &FeatureVector, dna: &DnaDescriptor<N, R, A>) -> DnaResult<Scores>
where
    N: Normalizer,
    A: AnomalyModel,
{
    if let Some((feature, _)) = candidate.iter().find(|(_, value)| !value.is_finite()) {
        return Err(DnaError::NonFiniteCandidate { feature });
    }

    let cosine = round_to(
        cosine_similarity(candidate, &dna.raw().mean).clamp(0.0, 1.0) + 0.0,
        4,
    );
    let mahalanobis = round_to(mahalanobis_score(dna.mahalanobis(candidate)), 4);
    let raw_anomaly = dna.anomaly_model().score(&dna.normalize(candidate));
    let isolation = round_to(anomaly_score(raw_anomaly), 4);

    let composite = round_to(
        WEIGHTS.cosine * cosine + WEIGHTS.mahalanobis * mahalanobis + WEIGHTS.isolation * isolation,
        4,
    );
    if !composite.is_finite() {
        return Err(DnaError::NonFiniteScore);
    }

    Ok(Scores {
        cosine_similarity: cosine,
        mahalanobis_fit: mahalanobis,
        isolation_forest: isolation,
        composite,
    })
}

/// Score a track and label the result with the song, artist and playlist.
pub fn score_track<N, R, A>(track: &Track, dna: &DnaDescriptor<N, R, A>) -> DnaResult<ScoreReport>
where
    N: Normalizer,
    A: AnomalyModel,
{
    let scores = score_vector(&track.vector(), dna)?;
    let verdict = Verdict::from_composite(scores.composite);
    log::debug!(
        "scored '{}' against '{}': {:.4} ({verdict})",
        track.name,
        dna.playlist_name(),
        scores.composite
    );
    Ok(ScoreReport {
        song: track.name.clone(),
        artist: track.artist.clone(),
        playlist: dna.playlist_name().to_string(),
        scores,
        weights: WEIGHTS,
        verdict,
    })
}
