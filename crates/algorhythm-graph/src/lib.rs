//! Artist neighborhood mapping for algorhythm.
//!
//! Crawls comparable artists around a root artist, ranks them by acoustic
//! distance to a target track, maps the playlists an artist is discovered
//! on, and exports neighborhoods as petgraph graphs.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod discovered_on;
pub mod error;
pub mod neighborhood;
pub mod twins;

pub use discovered_on::{discovered_on, DiscoveredOn, DiscoveredPlaylist};
pub use error::{GraphError, GraphResult};
pub use neighborhood::{
    build_neighborhood, crawl_queries, ArtistNode, Neighbor, NeighborhoodGraph, Query,
};
pub use twins::{find_sonic_twins, rank_twins, SonicTwin, SonicTwinResult};
