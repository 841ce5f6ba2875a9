//! The continuous audio feature space.
//!
//! Every statistical component works in the same 9-dimensional space, in
//! the order given by [`Feature::ALL`]. [`FeatureVector`] is the dense form
//! used for arithmetic; [`AudioFeatures`] is the named form exchanged with
//! providers, where an absent dimension reads as `0.0`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Number of continuous dimensions in the feature space.
pub const FEATURE_COUNT: usize = 9;

/// One named dimension of the feature space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Danceability,
    Energy,
    Loudness,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Tempo,
}

impl Feature {
    /// All features in canonical order.
    pub const ALL: [Self; FEATURE_COUNT] = [
        Self::Danceability,
        Self::Energy,
        Self::Loudness,
        Self::Speechiness,
        Self::Acousticness,
        Self::Instrumentalness,
        Self::Liveness,
        Self::Valence,
        Self::Tempo,
    ];

    /// Position of this feature in a [`FeatureVector`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Danceability => "danceability",
            Self::Energy => "energy",
            Self::Loudness => "loudness",
            Self::Speechiness => "speechiness",
            Self::Acousticness => "acousticness",
            Self::Instrumentalness => "instrumentalness",
            Self::Liveness => "liveness",
            Self::Valence => "valence",
            Self::Tempo => "tempo",
        }
    }

    /// Look up a feature by its snake_case name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dense point in the feature space, indexed by [`Feature`].
///
/// Serializes as a map keyed by feature name, so stored descriptors and
/// tuning files stay readable and independent of the in-memory ordering.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub const fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    #[must_use]
    pub const fn zeros() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    /// A vector with every dimension set to `value`.
    #[must_use]
    pub const fn splat(value: f64) -> Self {
        Self([value; FEATURE_COUNT])
    }

    #[must_use]
    pub const fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    #[must_use]
    pub const fn into_array(self) -> [f64; FEATURE_COUNT] {
        self.0
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    #[must_use]
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.0[feature.index()] = value;
        self
    }

    /// Iterate `(feature, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().zip(self.0.iter().copied())
    }

    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    #[must_use]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance in raw units.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: Feature) -> &f64 {
        &self.0[feature.index()]
    }
}

impl IndexMut<Feature> for FeatureVector {
    fn index_mut(&mut self, feature: Feature) -> &mut f64 {
        &mut self.0[feature.index()]
    }
}

impl TryFrom<BTreeMap<String, f64>> for FeatureVector {
    type Error = String;

    fn try_from(named: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut vector = Self::zeros();
        for (name, value) in &named {
            let feature =
                Feature::from_name(name).ok_or_else(|| format!("unknown feature '{name}'"))?;
            vector[feature] = *value;
        }
        if let Some(missing) = Feature::ALL
            .into_iter()
            .find(|f| !named.keys().any(|k| k.eq_ignore_ascii_case(f.name())))
        {
            return Err(format!("missing feature '{missing}'"));
        }
        Ok(vector)
    }
}

impl From<FeatureVector> for BTreeMap<String, f64> {
    fn from(vector: FeatureVector) -> Self {
        vector
            .iter()
            .map(|(feature, value)| (feature.name().to_string(), value))
            .collect()
    }
}

/// Audio features as reported by a feature provider.
///
/// Absent continuous dimensions default to `0.0`. `key` and `mode` are the
/// two auxiliary categorical attributes; they never enter the feature
/// space but are tabulated into the DNA's categorical distributions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<i32>,
}

impl AudioFeatures {
    /// Project onto the dense feature space in canonical order.
    #[must_use]
    pub fn vector(&self) -> FeatureVector {
        FeatureVector([
            self.danceability,
            self.energy,
            self.loudness,
            self.speechiness,
            self.acousticness,
            self.instrumentalness,
            self.liveness,
            self.valence,
            self.tempo,
        ])
    }

    #[must_use]
    pub fn with_key_mode(mut self, key: i32, mode: i32) -> Self {
        self.key = Some(key);
        self.mode = Some(mode);
        self
    }
}

impl From<FeatureVector> for AudioFeatures {
    fn from(vector: FeatureVector) -> Self {
        let [danceability, energy, loudness, speechiness, acousticness, instrumentalness, liveness, valence, tempo] =
            vector.into_array();
        Self {
            danceability,
            energy,
            loudness,
            speechiness,
            acousticness,
            instrumentalness,
            liveness,
            valence,
            tempo,
            key: None,
            mode: None,
        }
    }
}
