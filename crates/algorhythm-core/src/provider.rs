//! Contracts for the external catalogs the engine reads from.
//!
//! Retrieval, authentication and transport live behind these traits. The
//! statistical core only ever sees the records they return, and treats an
//! absent feature set as "no data" rather than a failure.

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::features::AudioFeatures;
use crate::model::{ArtistProfile, PlaylistSummary, TrackSummary};

/// Source of audio feature vectors keyed by track id.
#[async_trait]
pub trait FeatureProvider: Send + Sync {
    /// Features for one track, or `None` when the provider has no data.
    async fn features(&self, track_id: &str) -> ProviderResult<Option<AudioFeatures>>;

    /// Features for many tracks. Tracks without data are omitted.
    async fn features_for(
        &self,
        track_ids: &[String],
    ) -> ProviderResult<Vec<(String, AudioFeatures)>> {
        let mut found = Vec::with_capacity(track_ids.len());
        for id in track_ids {
            if let Some(features) = self.features(id).await? {
                found.push((id.clone(), features));
            }
        }
        Ok(found)
    }
}

/// Source of artist, track and playlist metadata.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn artist(&self, artist_id: &str) -> ProviderResult<ArtistProfile>;

    async fn search_by_genre(&self, genre: &str, limit: usize)
        -> ProviderResult<Vec<ArtistProfile>>;

    async fn search_by_name(&self, name: &str, limit: usize) -> ProviderResult<Vec<ArtistProfile>>;

    async fn track(&self, track_id: &str) -> ProviderResult<TrackSummary>;

    /// The artist's most representative tracks, best first.
    async fn top_tracks(&self, artist_id: &str) -> ProviderResult<Vec<TrackSummary>>;

    async fn search_playlists(
        &self,
        query: &str,
        limit: usize,
    ) -> ProviderResult<Vec<PlaylistSummary>>;

    async fn playlist_followers(&self, playlist_id: &str) -> ProviderResult<u64>;
}
