//! File-backed catalog.
//!
//! A [`JsonCatalog`] holds artists, tracks (optionally with audio
//! features), top-track lists and playlists loaded from one JSON
//! document, and serves them through both provider traits. Searches are
//! case-insensitive substring matches, which is close enough to a
//! streaming catalog's search for offline analysis and tests.
//!
//! ```json
//! {
//!   "artists": [{"id": "a1", "name": "Nova", "genres": ["rap"], "popularity": 60}],
//!   "tracks": [{"id": "t1", "name": "Glow", "artist": "Nova", "artist_id": "a1",
//!               "features": {"danceability": 0.7, "tempo": 121.0, "key": 5}}],
//!   "top_tracks": {"a1": ["t1"]},
//!   "playlists": [{"id": "p1", "name": "Late Night", "owner_id": "spotify",
//!                  "followers": 12000, "tracks": ["t1"]}]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use algorhythm_core::{
    ArtistProfile, AudioFeatures, FeatureProvider, MetadataProvider, PlaylistSummary,
    ProviderError, ProviderResult, TrackSummary,
};

use crate::error::{FetchError, FetchResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<AudioFeatures>,
}

impl CatalogTrack {
    fn summary(&self) -> TrackSummary {
        TrackSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            artist: self.artist.clone(),
            popularity: self.popularity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPlaylist {
    #[serde(flatten)]
    pub summary: PlaylistSummary,
    #[serde(default)]
    pub followers: u64,
    /// Track ids in playlist order.
    #[serde(default)]
    pub tracks: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogDocument {
    artists: Vec<ArtistProfile>,
    tracks: Vec<CatalogTrack>,
    top_tracks: HashMap<String, Vec<String>>,
    playlists: Vec<CatalogPlaylist>,
}

/// An in-memory catalog loaded from JSON.
#[derive(Debug, Default)]
pub struct JsonCatalog {
    artists: Vec<ArtistProfile>,
    tracks: Vec<CatalogTrack>,
    top_tracks: HashMap<String, Vec<String>>,
    playlists: Vec<CatalogPlaylist>,
    artist_index: HashMap<String, usize>,
    track_index: HashMap<String, usize>,
}

fn not_found(entity: &'static str, id: &str) -> ProviderError {
    ProviderError::NotFound {
        entity,
        id: id.to_string(),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl JsonCatalog {
    /// Read and index a catalog file.
    pub fn load(path: impl AsRef<Path>) -> FetchResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&contents)?;
        info!(
            "loaded catalog {}: {} artists, {} tracks, {} playlists",
            path.display(),
            catalog.artists.len(),
            catalog.tracks.len(),
            catalog.playlists.len()
        );
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> FetchResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        let artist_index = doc
            .artists
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();
        let track_index = doc
            .tracks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        Ok(Self {
            artists: doc.artists,
            tracks: doc.tracks,
            top_tracks: doc.top_tracks,
            playlists: doc.playlists,
            artist_index,
            track_index,
        })
    }

    fn find_track(&self, track_id: &str) -> Option<&CatalogTrack> {
        self.track_index.get(track_id).map(|&i| &self.tracks[i])
    }

    pub fn playlist(&self, playlist_id: &str) -> ProviderResult<&CatalogPlaylist> {
        self.playlists
            .iter()
            .find(|p| p.summary.id == playlist_id)
            .ok_or_else(|| not_found("playlist", playlist_id))
    }

    fn search_artists<P>(&self, limit: usize, matches: P) -> Vec<ArtistProfile>
    where
        P: Fn(&ArtistProfile) -> bool,
    {
        self.artists
            .iter()
            .filter(|a| matches(a))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MetadataProvider for JsonCatalog {
    async fn artist(&self, artist_id: &str) -> ProviderResult<ArtistProfile> {
        self.artist_index
            .get(artist_id)
            .map(|&i| self.artists[i].clone())
            .ok_or_else(|| not_found("artist", artist_id))
    }

    async fn search_by_genre(
        &self,
        genre: &str,
        limit: usize,
    ) -> ProviderResult<Vec<ArtistProfile>> {
        Ok(self.search_artists(limit, |a| {
            a.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
        }))
    }

    async fn search_by_name(&self, name: &str, limit: usize) -> ProviderResult<Vec<ArtistProfile>> {
        Ok(self.search_artists(limit, |a| contains_ci(&a.name, name)))
    }

    async fn track(&self, track_id: &str) -> ProviderResult<TrackSummary> {
        self.find_track(track_id)
            .map(CatalogTrack::summary)
            .ok_or_else(|| not_found("track", track_id))
    }

    /// The explicit top-track list when present, else the artist's tracks
    /// by popularity.
    async fn top_tracks(&self, artist_id: &str) -> ProviderResult<Vec<TrackSummary>> {
        if let Some(ids) = self.top_tracks.get(artist_id) {
            return Ok(ids
                .iter()
                .filter_map(|id| self.find_track(id))
                .map(CatalogTrack::summary)
                .collect());
        }
        let mut tracks: Vec<&CatalogTrack> = self
            .tracks
            .iter()
            .filter(|t| t.artist_id.as_deref() == Some(artist_id))
            .collect();
        tracks.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        Ok(tracks.into_iter().map(CatalogTrack::summary).collect())
    }

    async fn search_playlists(
        &self,
        query: &str,
        limit: usize,
    ) -> ProviderResult<Vec<PlaylistSummary>> {
        Ok(self
            .playlists
            .iter()
            .filter(|p| {
                contains_ci(&p.summary.name, query) || contains_ci(&p.summary.description, query)
            })
            .take(limit)
            .map(|p| p.summary.clone())
            .collect())
    }

    async fn playlist_followers(&self, playlist_id: &str) -> ProviderResult<u64> {
        self.playlist(playlist_id).map(|p| p.followers)
    }
}

#[async_trait]
impl FeatureProvider for JsonCatalog {
    async fn features(&self, track_id: &str) -> ProviderResult<Option<AudioFeatures>> {
        Ok(self.find_track(track_id).and_then(|t| t.features.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "artists": [
            {"id": "a1", "name": "Nova", "genres": ["Rap", "trap"], "popularity": 60},
            {"id": "a2", "name": "Supernova", "genres": ["pop"], "popularity": 40}
        ],
        "tracks": [
            {"id": "t1", "name": "Glow", "artist": "Nova", "artist_id": "a1",
             "popularity": 30, "features": {"energy": 0.8, "tempo": 120.0, "mode": 1}},
            {"id": "t2", "name": "Fade", "artist": "Nova", "artist_id": "a1",
             "popularity": 70, "features": {"energy": 0.4, "tempo": 90.0}},
            {"id": "t3", "name": "Bare", "artist": "Supernova", "artist_id": "a2"}
        ],
        "playlists": [
            {"id": "p1", "name": "Nova Radio", "owner_id": "spotify",
             "followers": 900, "tracks": ["t1", "t3", "gone", "t2"]}
        ]
    }"#;

    fn catalog() -> JsonCatalog {
        JsonCatalog::from_json_str(DOC).unwrap()
    }

    #[tokio::test]
    async fn test_genre_search_is_exact_and_case_insensitive() {
        let found = catalog().search_by_genre("rap", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a1");
    }

    #[tokio::test]
    async fn test_name_search_matches_substrings() {
        let found = catalog().search_by_name("nova", 10).await.unwrap();
        assert_eq!(found.len(), 2);
        let capped = catalog().search_by_name("nova", 1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn test_top_tracks_fall_back_to_popularity() {
        let top = catalog().top_tracks("a1").await.unwrap();
        let ids: Vec<&str> = top.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t2", "t1"]);
    }

    #[tokio::test]
    async fn test_features_absent_is_none() {
        let catalog = catalog();
        assert!(catalog.features("t3").await.unwrap().is_none());
        assert!(catalog.features("unknown").await.unwrap().is_none());
        assert_eq!(catalog.features("t1").await.unwrap().unwrap().mode, Some(1));
    }

    #[test]
    fn test_playlist_lookup() {
        let catalog = catalog();
        let playlist = catalog.playlist("p1").unwrap();
        assert_eq!(playlist.tracks, ["t1", "t3", "gone", "t2"]);
        assert!(catalog.playlist("p9").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_artist_is_not_found() {
        let err = catalog().artist("zz").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
