//! Concrete providers and application configuration for algorhythm.
//!
//! [`JsonCatalog`] serves artist, track and playlist metadata (and,
//! optionally, audio features) from a JSON file. [`FeaturesClient`] fetches
//! audio features from a remote service with rate limiting and retries.
//! [`Config`] layers the config file with `ALGO_*` environment variables.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod features_client;
pub mod resilience;

pub use catalog::{CatalogPlaylist, CatalogTrack, JsonCatalog};
pub use config::Config;
pub use error::{FetchError, FetchResult};
pub use features_client::{decode_batch, FeaturesClient, BATCH_SIZE};
pub use resilience::RateLimiter;
