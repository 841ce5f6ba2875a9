//! In-memory catalog used by the graph integration tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use algorhythm_core::{
    ArtistProfile, AudioFeatures, FeatureProvider, MetadataProvider, PlaylistSummary,
    ProviderError, ProviderResult, TrackSummary,
};

#[derive(Debug, Default)]
pub struct StubCatalog {
    artists: HashMap<String, ArtistProfile>,
    genre_hits: HashMap<String, Vec<String>>,
    name_hits: HashMap<String, Vec<String>>,
    tracks: HashMap<String, TrackSummary>,
    top_tracks: HashMap<String, Vec<String>>,
    features: HashMap<String, AudioFeatures>,
    playlists: HashMap<String, Vec<PlaylistSummary>>,
    followers: HashMap<String, u64>,
    /// Queries and ids whose lookups fail.
    failing: HashSet<String>,
}

fn http_error(what: &str) -> ProviderError {
    ProviderError::Http {
        source_name: "stub".into(),
        message: format!("boom: {what}"),
    }
}

#[allow(dead_code)]
impl StubCatalog {
    pub fn with_artist(mut self, profile: ArtistProfile) -> Self {
        self.artists.insert(profile.id.clone(), profile);
        self
    }

    pub fn genre_hit(mut self, genre: &str, ids: &[&str]) -> Self {
        self.genre_hits
            .insert(genre.into(), ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn name_hit(mut self, name: &str, ids: &[&str]) -> Self {
        self.name_hits
            .insert(name.into(), ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_track(
        mut self,
        id: &str,
        name: &str,
        artist: &str,
        features: Option<AudioFeatures>,
    ) -> Self {
        self.tracks.insert(
            id.into(),
            TrackSummary {
                id: id.into(),
                name: name.into(),
                artist: artist.into(),
                popularity: 50,
            },
        );
        if let Some(features) = features {
            self.features.insert(id.into(), features);
        }
        self
    }

    pub fn top(mut self, artist_id: &str, track_ids: &[&str]) -> Self {
        self.top_tracks.insert(
            artist_id.into(),
            track_ids.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn playlists(mut self, query: &str, found: Vec<PlaylistSummary>) -> Self {
        self.playlists.insert(query.into(), found);
        self
    }

    pub fn followers(mut self, playlist_id: &str, count: u64) -> Self {
        self.followers.insert(playlist_id.into(), count);
        self
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.into());
        self
    }

    fn resolve(&self, ids: &[String], limit: usize) -> Vec<ArtistProfile> {
        ids.iter()
            .filter_map(|id| self.artists.get(id).cloned())
            .take(limit)
            .collect()
    }

    fn check(&self, key: &str) -> ProviderResult<()> {
        if self.failing.contains(key) {
            Err(http_error(key))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MetadataProvider for StubCatalog {
    async fn artist(&self, artist_id: &str) -> ProviderResult<ArtistProfile> {
        self.artists
            .get(artist_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                entity: "artist",
                id: artist_id.into(),
            })
    }

    async fn search_by_genre(&self, genre: &str, limit: usize) -> ProviderResult<Vec<ArtistProfile>> {
        self.check(genre)?;
        Ok(self
            .genre_hits
            .get(genre)
            .map(|ids| self.resolve(ids, limit))
            .unwrap_or_default())
    }

    async fn search_by_name(&self, name: &str, limit: usize) -> ProviderResult<Vec<ArtistProfile>> {
        self.check(name)?;
        Ok(self
            .name_hits
            .get(name)
            .map(|ids| self.resolve(ids, limit))
            .unwrap_or_default())
    }

    async fn track(&self, track_id: &str) -> ProviderResult<TrackSummary> {
        self.tracks
            .get(track_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                entity: "track",
                id: track_id.into(),
            })
    }

    async fn top_tracks(&self, artist_id: &str) -> ProviderResult<Vec<TrackSummary>> {
        self.check(artist_id)?;
        Ok(self
            .top_tracks
            .get(artist_id)
            .map(|ids| ids.iter().filter_map(|id| self.tracks.get(id).cloned()).collect())
            .unwrap_or_default())
    }

    async fn search_playlists(&self, query: &str, limit: usize) -> ProviderResult<Vec<PlaylistSummary>> {
        self.check(query)?;
        Ok(self
            .playlists
            .get(query)
            .map(|found| found.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn playlist_followers(&self, playlist_id: &str) -> ProviderResult<u64> {
        self.followers
            .get(playlist_id)
            .copied()
            .ok_or_else(|| http_error(playlist_id))
    }
}

#[async_trait]
impl FeatureProvider for StubCatalog {
    async fn features(&self, track_id: &str) -> ProviderResult<Option<AudioFeatures>> {
        Ok(self.features.get(track_id).cloned())
    }
}

#[allow(dead_code)]
pub fn playlist(id: &str, owner_id: &str) -> PlaylistSummary {
    PlaylistSummary {
        id: id.into(),
        name: format!("Playlist {id}"),
        owner_id: owner_id.into(),
        owner_name: String::new(),
        description: String::new(),
        url: format!("https://open.spotify.com/playlist/{id}"),
    }
}
