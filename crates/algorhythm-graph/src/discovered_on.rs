//! Playlists an artist is discovered on.
//!
//! The catalog does not expose this list, so it is approximated by
//! searching playlists for the artist's name and ranking the hits by
//! authority: editorial playlists first, then by follower count.

use std::collections::HashSet;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use algorhythm_core::{MetadataProvider, PlaylistSummary, Tuning};

use crate::error::{GraphError, GraphResult};

const QUERY_SUFFIXES: [&str; 3] = ["", " mix", " radio"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPlaylist {
    pub id: String,
    pub name: String,
    /// Owner display name, or the owner id when it has none.
    pub owner: String,
    pub owner_id: String,
    pub description: String,
    pub is_editorial: bool,
    pub url: String,
    pub followers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredOn {
    pub artist: ArtistRef,
    /// Every playlist found, most authoritative first.
    pub playlists: Vec<DiscoveredPlaylist>,
    pub entry_points: Vec<DiscoveredPlaylist>,
    pub total_found: usize,
}

impl DiscoveredPlaylist {
    fn from_summary(summary: PlaylistSummary, editorial_owner: &str) -> Self {
        let owner = if summary.owner_name.is_empty() {
            summary.owner_id.clone()
        } else {
            summary.owner_name
        };
        Self {
            is_editorial: summary.owner_id == editorial_owner,
            id: summary.id,
            name: summary.name,
            owner,
            owner_id: summary.owner_id,
            description: summary.description,
            url: summary.url,
            followers: 0,
        }
    }
}

/// Search, dedupe and rank the playlists featuring `artist_id`.
pub async fn discovered_on<M>(
    provider: &M,
    artist_id: &str,
    tuning: &Tuning,
) -> GraphResult<DiscoveredOn>
where
    M: MetadataProvider + ?Sized,
{
    let discovery = &tuning.discovery;
    let artist = provider
        .artist(artist_id)
        .await
        .map_err(|source| GraphError::ArtistUnresolved {
            id: artist_id.to_string(),
            source,
        })?;
    info!("finding playlists for {}", artist.name);

    let mut seen = HashSet::new();
    let mut playlists = Vec::new();
    for suffix in QUERY_SUFFIXES {
        let query = format!("{}{suffix}", artist.name);
        match provider.search_playlists(&query, discovery.page_size).await {
            Ok(found) => playlists.extend(
                found
                    .into_iter()
                    .filter(|p| seen.insert(p.id.clone()))
                    .map(|p| DiscoveredPlaylist::from_summary(p, &discovery.editorial_owner)),
            ),
            Err(e) => warn!("search error for '{query}': {e}"),
        }
    }

    for playlist in &mut playlists {
        playlist.followers = match provider.playlist_followers(&playlist.id).await {
            Ok(followers) => followers,
            Err(e) => {
                debug!("no follower count for {}: {e}", playlist.id);
                0
            }
        };
    }

    playlists.sort_by(|a, b| (b.is_editorial, b.followers).cmp(&(a.is_editorial, a.followers)));
    let entry_points: Vec<DiscoveredPlaylist> = playlists
        .iter()
        .filter(|p| p.is_editorial || p.followers > discovery.min_followers)
        .take(discovery.max_entry_points)
        .cloned()
        .collect();

    info!(
        "found {} playlists, {} entry points",
        playlists.len(),
        entry_points.len()
    );
    Ok(DiscoveredOn {
        artist: ArtistRef {
            id: artist_id.to_string(),
            name: artist.name,
        },
        total_found: playlists.len(),
        playlists,
        entry_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(owner_id: &str, owner_name: &str) -> PlaylistSummary {
        PlaylistSummary {
            id: "p1".into(),
            name: "Mix".into(),
            owner_id: owner_id.into(),
            owner_name: owner_name.into(),
            description: String::new(),
            url: String::new(),
        }
    }

    #[test]
    fn test_editorial_flag_and_owner_fallback() {
        let editorial = DiscoveredPlaylist::from_summary(summary("spotify", "Spotify"), "spotify");
        assert!(editorial.is_editorial);
        assert_eq!(editorial.owner, "Spotify");

        let user = DiscoveredPlaylist::from_summary(summary("dj42", ""), "spotify");
        assert!(!user.is_editorial);
        assert_eq!(user.owner, "dj42");
    }
}
