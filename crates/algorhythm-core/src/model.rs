use serde::{Deserialize, Serialize};

use crate::features::{AudioFeatures, FeatureVector};

/// A track in a working sample: display metadata plus its audio features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(flatten)]
    pub features: AudioFeatures,
}

impl Track {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        artist: impl Into<String>,
        features: AudioFeatures,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist: artist.into(),
            features,
        }
    }

    #[must_use]
    pub fn vector(&self) -> FeatureVector {
        self.features.vector()
    }
}

/// Catalog metadata for a track, without audio features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub popularity: u32,
}

/// Catalog metadata for an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Catalog popularity on a 0-100 scale.
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub followers: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ArtistProfile {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            genres: Vec::new(),
            popularity: 0,
            followers: 0,
            image: None,
        }
    }

    #[must_use]
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_popularity(mut self, popularity: u32) -> Self {
        self.popularity = popularity;
        self
    }

    #[must_use]
    pub fn with_followers(mut self, followers: u64) -> Self {
        self.followers = followers;
        self
    }
}

/// Catalog metadata for a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

/// Extract a bare catalog id from either an id or a share URL such as
/// `https://open.spotify.com/artist/4Z8W4fKeB5YxbusRsdQVPb?si=abc`.
pub fn entity_id_from_url(url_or_id: &str) -> &str {
    let last = url_or_id.rsplit('/').next().unwrap_or(url_or_id);
    last.split('?').next().unwrap_or(last)
}
