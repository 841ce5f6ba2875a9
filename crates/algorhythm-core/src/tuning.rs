//! Versioned tuning tables.
//!
//! The hand-tuned reference constants used by the cohesion reporter, the
//! neighborhood crawler and the sonic twin matcher. [`Tuning::default`]
//! reproduces the built-in values exactly; a TOML file (see
//! `config/tuning.toml`) may override any section. Sections missing from
//! the file keep their defaults.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use algorhythm_core::tuning::Tuning;
//!
//! let tuning = Tuning::load(Path::new("config/tuning.toml")).unwrap();
//! assert_eq!(tuning.version, 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::features::{Feature, FeatureVector};

/// Current tuning schema version.
pub const TUNING_VERSION: u32 = 1;

/// Top-level container for all tuning tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub version: u32,
    pub features: FeatureTables,
    /// Genre to hand-curated related genres and sub-genres.
    pub genre_adjacency: BTreeMap<String, Vec<String>>,
    pub crawl: CrawlTuning,
    pub twins: TwinTuning,
    pub discovery: DiscoveryTuning,
}

/// Per-feature reference tables for the cohesion report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureTables {
    /// Theoretical span of each feature.
    pub natural_range: FeatureVector,
    /// Value of each feature for "typical" music.
    pub baseline: FeatureVector,
}

/// Neighborhood crawler parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlTuning {
    /// Weight of the shared-genre fraction in the relevance score.
    pub genre_weight: f64,
    /// Weight of popularity proximity in the relevance score.
    pub popularity_weight: f64,
    /// Candidates below this popularity are dropped.
    pub min_popularity: u32,
    /// Page size requested per query.
    pub page_size: usize,
    /// How many of the root's genres become direct genre queries.
    pub genre_queries: usize,
    /// How many of the root's genres are expanded through the adjacency table.
    pub adjacency_genres: usize,
}

/// Sonic twin matcher parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinTuning {
    /// Distance decay constant for the similarity percentage.
    pub decay: f64,
    /// Representative tracks fetched per neighbor.
    pub tracks_per_neighbor: usize,
    /// Closest tracks reported per twin.
    pub closest_tracks: usize,
    /// Neighborhood size crawled when the caller does not supply one.
    pub neighborhood_size: usize,
    pub default_top_n: usize,
}

/// Discovered-on playlist mapper parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryTuning {
    pub page_size: usize,
    /// Owner id marking an editorial playlist.
    pub editorial_owner: String,
    /// Non-editorial playlists need more followers than this to be an entry point.
    pub min_followers: u64,
    pub max_entry_points: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            version: TUNING_VERSION,
            features: FeatureTables::default(),
            genre_adjacency: default_genre_adjacency(),
            crawl: CrawlTuning::default(),
            twins: TwinTuning::default(),
            discovery: DiscoveryTuning::default(),
        }
    }
}

impl Default for FeatureTables {
    fn default() -> Self {
        Self {
            natural_range: FeatureVector::new([1.0, 1.0, 60.0, 1.0, 1.0, 1.0, 1.0, 1.0, 200.0]),
            baseline: FeatureVector::new([0.55, 0.55, -8.0, 0.08, 0.30, 0.10, 0.18, 0.45, 120.0]),
        }
    }
}

impl Default for CrawlTuning {
    fn default() -> Self {
        Self {
            genre_weight: 0.6,
            popularity_weight: 0.4,
            min_popularity: 10,
            page_size: 50,
            genre_queries: 3,
            adjacency_genres: 2,
        }
    }
}

impl Default for TwinTuning {
    fn default() -> Self {
        Self {
            decay: 100.0,
            tracks_per_neighbor: 5,
            closest_tracks: 3,
            neighborhood_size: 20,
            default_top_n: 5,
        }
    }
}

impl Default for DiscoveryTuning {
    fn default() -> Self {
        Self {
            page_size: 20,
            editorial_owner: "spotify".to_string(),
            min_followers: 1000,
            max_entry_points: 10,
        }
    }
}

fn default_genre_adjacency() -> BTreeMap<String, Vec<String>> {
    const TABLE: &[(&str, [&str; 3])] = &[
        ("rap", ["hip hop", "trap", "r&b"]),
        ("pop", ["dance pop", "electropop", "indie pop"]),
        ("rock", ["alternative rock", "indie rock", "punk"]),
        ("hip hop", ["rap", "trap", "conscious hip hop"]),
        ("r&b", ["neo soul", "contemporary r&b", "hip hop"]),
        ("trap", ["rap", "hip hop", "drill"]),
        ("indie", ["alternative", "indie rock", "indie pop"]),
    ];
    TABLE
        .iter()
        .map(|(genre, related)| {
            (
                (*genre).to_string(),
                related.iter().map(|r| (*r).to_string()).collect(),
            )
        })
        .collect()
}

impl Tuning {
    /// Load tuning tables from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let tuning = Self::from_toml_str(&content).map_err(|e| {
            Error::InvalidData(format!(
                "failed to load tuning from {}: {}",
                path.display(),
                e
            ))
        })?;
        log::debug!("Loaded tuning v{} from {}", tuning.version, path.display());
        Ok(tuning)
    }

    /// Parse and validate tuning tables from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let tuning: Self =
            toml::from_str(content).map_err(|e| Error::InvalidData(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject tables the scoring formulas cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.version > TUNING_VERSION {
            return Err(Error::InvalidData(format!(
                "tuning version {} is newer than supported version {}",
                self.version, TUNING_VERSION
            )));
        }
        for (feature, range) in self.features.natural_range.iter() {
            if !(range.is_finite() && range > 0.0) {
                return Err(Error::InvalidData(format!(
                    "natural range for {feature} must be positive, got {range}"
                )));
            }
        }
        if !self.features.baseline.is_finite() {
            return Err(Error::InvalidData("baseline values must be finite".to_string()));
        }
        if self.crawl.genre_weight < 0.0 || self.crawl.popularity_weight < 0.0 {
            return Err(Error::InvalidData(
                "crawl weights must be non-negative".to_string(),
            ));
        }
        if !(self.twins.decay.is_finite() && self.twins.decay > 0.0) {
            return Err(Error::InvalidData(format!(
                "twin decay must be positive, got {}",
                self.twins.decay
            )));
        }
        Ok(())
    }

    pub fn natural_range(&self, feature: Feature) -> f64 {
        self.features.natural_range[feature]
    }

    pub fn baseline(&self, feature: Feature) -> f64 {
        self.features.baseline[feature]
    }

    /// Related genres for `genre`, empty when the table has no entry.
    pub fn adjacent_genres(&self, genre: &str) -> &[String] {
        self.genre_adjacency
            .get(genre)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::InvalidData(e.to_string()))
    }
}
