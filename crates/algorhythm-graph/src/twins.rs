//! Sonic twin matcher.
//!
//! Ranks the artists of a neighborhood by how close their top tracks sit
//! to a target track in the raw feature space.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use algorhythm_core::{round_to, FeatureProvider, FeatureVector, MetadataProvider, Tuning};

use crate::error::{GraphError, GraphResult};
use crate::neighborhood::{build_neighborhood, Neighbor, NeighborhoodGraph};

/// A representative track and its distance to the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosestTrack {
    pub name: String,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SonicTwin {
    pub artist_id: String,
    pub artist_name: String,
    pub genres: Vec<String>,
    pub popularity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub similarity_pct: f64,
    pub tracks_analyzed: usize,
    pub closest_tracks: Vec<ClosestTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwinTarget {
    pub name: String,
    pub artist: String,
    pub track_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SonicTwinResult {
    pub target: TwinTarget,
    pub twins: Vec<SonicTwin>,
    /// Neighbors that had features to compare, before truncation.
    pub total_compared: usize,
}

/// `exp(-distance / decay)` as a percentage, rounded to 2 decimals.
#[must_use]
pub fn similarity_pct(avg_distance: f64, decay: f64) -> f64 {
    round_to((-avg_distance / decay).exp() * 100.0, 2)
}

/// Compare `target` with one neighbor's representative vectors.
///
/// `samples` pairs each track name with its vector; `None` when empty.
#[must_use]
pub fn compare(
    target: &FeatureVector,
    neighbor: &Neighbor,
    samples: &[(String, FeatureVector)],
    tuning: &Tuning,
) -> Option<SonicTwin> {
    if samples.is_empty() {
        return None;
    }
    let distances: Vec<f64> = samples.iter().map(|(_, v)| target.distance(v)).collect();
    let avg = distances.iter().sum::<f64>() / distances.len() as f64;
    let min = distances.iter().copied().fold(f64::INFINITY, f64::min);

    let mut closest_tracks: Vec<ClosestTrack> = samples
        .iter()
        .zip(&distances)
        .map(|((name, _), d)| ClosestTrack {
            name: name.clone(),
            distance: round_to(*d, 4),
        })
        .collect();
    closest_tracks.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    closest_tracks.truncate(tuning.twins.closest_tracks);

    Some(SonicTwin {
        artist_id: neighbor.id.clone(),
        artist_name: neighbor.name.clone(),
        genres: neighbor.genres.clone(),
        popularity: neighbor.popularity,
        image: neighbor.image.clone(),
        avg_distance: round_to(avg, 4),
        min_distance: round_to(min, 4),
        similarity_pct: similarity_pct(avg, tuning.twins.decay),
        tracks_analyzed: distances.len(),
        closest_tracks,
    })
}

/// Representative (name, vector) pairs for one neighbor.
async fn representative_vectors<M, F>(
    metadata: &M,
    features: &F,
    neighbor: &Neighbor,
    tuning: &Tuning,
) -> Option<Vec<(String, FeatureVector)>>
where
    M: MetadataProvider + ?Sized,
    F: FeatureProvider + ?Sized,
{
    let tracks = match metadata.top_tracks(&neighbor.id).await {
        Ok(tracks) => tracks,
        Err(e) => {
            warn!("error processing {}: {e}", neighbor.name);
            return None;
        }
    };
    let tracks: Vec<_> = tracks
        .into_iter()
        .take(tuning.twins.tracks_per_neighbor)
        .collect();
    if tracks.is_empty() {
        debug!("{} has no top tracks", neighbor.name);
        return None;
    }

    let ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
    let found = match features.features_for(&ids).await {
        Ok(found) => found,
        Err(e) => {
            warn!("error fetching features for {}: {e}", neighbor.name);
            return None;
        }
    };

    Some(
        found
            .into_iter()
            .map(|(id, f)| {
                let name = tracks
                    .iter()
                    .find(|t| t.id == id)
                    .map_or_else(|| "Unknown".to_string(), |t| t.name.clone());
                (name, f.vector())
            })
            .collect(),
    )
}

/// Rank the neighbors of `neighborhood` by distance to `target`.
///
/// Returns the best `top_n` twins and how many neighbors were compared.
pub async fn rank_twins<M, F>(
    metadata: &M,
    features: &F,
    target: &FeatureVector,
    neighborhood: &NeighborhoodGraph,
    top_n: usize,
    tuning: &Tuning,
) -> (Vec<SonicTwin>, usize)
where
    M: MetadataProvider + ?Sized,
    F: FeatureProvider + ?Sized,
{
    let mut twins = Vec::new();
    for neighbor in &neighborhood.neighbors {
        let Some(samples) = representative_vectors(metadata, features, neighbor, tuning).await
        else {
            continue;
        };
        if let Some(twin) = compare(target, neighbor, &samples, tuning) {
            debug!(
                "{}: avg_dist={:.2}, sim={:.1}%",
                twin.artist_name, twin.avg_distance, twin.similarity_pct
            );
            twins.push(twin);
        }
    }

    let total_compared = twins.len();
    twins.sort_by(|a, b| a.avg_distance.total_cmp(&b.avg_distance));
    twins.truncate(top_n);
    (twins, total_compared)
}

/// Find the artists around `artist_id` that sound most like `track_id`.
pub async fn find_sonic_twins<M, F>(
    metadata: &M,
    features: &F,
    track_id: &str,
    artist_id: &str,
    top_n: usize,
    tuning: &Tuning,
) -> GraphResult<SonicTwinResult>
where
    M: MetadataProvider + ?Sized,
    F: FeatureProvider + ?Sized,
{
    let unresolved = |source| GraphError::TrackUnresolved {
        id: track_id.to_string(),
        source,
    };
    let track = metadata.track(track_id).await.map_err(unresolved)?;
    let target = features
        .features(track_id)
        .await
        .map_err(unresolved)?
        .ok_or_else(|| GraphError::MissingTargetFeatures {
            name: track.name.clone(),
        })?
        .vector();
    info!("target: {} - {}", track.name, track.artist);

    let neighborhood =
        build_neighborhood(metadata, artist_id, tuning.twins.neighborhood_size, tuning)
            .await
            .map_err(|e| GraphError::Neighborhood(Box::new(e)))?;
    if neighborhood.neighbors.is_empty() {
        return Err(GraphError::EmptyNeighborhood);
    }
    info!(
        "comparing against {} neighborhood artists",
        neighborhood.neighbors.len()
    );

    let (twins, total_compared) =
        rank_twins(metadata, features, &target, &neighborhood, top_n, tuning).await;
    for (rank, twin) in twins.iter().enumerate() {
        info!(
            "{}. {}: {}% match",
            rank + 1,
            twin.artist_name,
            twin.similarity_pct
        );
    }

    Ok(SonicTwinResult {
        target: TwinTarget {
            name: track.name,
            artist: track.artist,
            track_id: track_id.to_string(),
        },
        twins,
        total_compared,
    })
}
