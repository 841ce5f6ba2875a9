//! Errors for neighborhood mapping.

use algorhythm_core::ProviderError;
use thiserror::Error;

/// Structural failures of a neighborhood, twin or playlist lookup.
///
/// Failures of individual search queries or neighbors are logged and
/// skipped; only the ones below abort the whole operation.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The root artist could not be fetched.
    #[error("failed to fetch artist {id}: {source}")]
    ArtistUnresolved { id: String, source: ProviderError },

    /// The target track or its features could not be fetched.
    #[error("failed to fetch track {id}: {source}")]
    TrackUnresolved { id: String, source: ProviderError },

    /// The feature provider has no data for the target track.
    #[error("no audio features found for '{name}'")]
    MissingTargetFeatures { name: String },

    /// The comparison neighborhood could not be built.
    #[error("failed to build neighborhood: {0}")]
    Neighborhood(#[source] Box<GraphError>),

    /// The crawl found nobody to compare against.
    #[error("no neighboring artists found for comparison")]
    EmptyNeighborhood,
}

/// Convenience alias for graph results.
pub type GraphResult<T> = std::result::Result<T, GraphError>;
