//! Core domain model for algorhythm.
//!
//! This crate defines the 9-dimensional audio feature space shared by the
//! DNA builder, the scorer and the sonic twin matcher, the track/artist/
//! playlist records exchanged with external catalogs, the provider
//! contracts those catalogs must honour, and the versioned tuning tables.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod features;
pub mod model;
pub mod numeric;
pub mod provider;
pub mod tuning;

pub use error::{Error, ProviderError, ProviderResult, Result};
pub use features::{AudioFeatures, Feature, FeatureVector, FEATURE_COUNT};
pub use model::{entity_id_from_url, ArtistProfile, PlaylistSummary, Track, TrackSummary};
pub use numeric::round_to;
pub use provider::{FeatureProvider, MetadataProvider};
pub use tuning::Tuning;
