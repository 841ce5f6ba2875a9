//! Neighborhood crawler.
//!
//! Discovers artists comparable to a root artist through a bounded set of
//! genre and name searches, scores each candidate by genre overlap and
//! popularity proximity, and keeps the best matches.

use std::collections::HashSet;
use std::fmt;

use log::{debug, info, warn};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use algorhythm_core::tuning::CrawlTuning;
use algorhythm_core::{round_to, ArtistProfile, MetadataProvider, Tuning};

use crate::error::{GraphError, GraphResult};

/// One search issued by the crawler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    /// Artists tagged with a genre.
    Genre(String),
    /// Free-text artist search.
    Name(String),
}

impl Query {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Genre(text) | Self::Name(text) => text,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genre(genre) => write!(f, "genre:\"{genre}\""),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// A candidate that survived filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub popularity: u32,
    pub followers: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Text of the query that first surfaced this artist.
    pub matched_genre: String,
    pub relevance_score: f64,
}

/// A root artist and its ranked neighbors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodGraph {
    pub root: ArtistProfile,
    /// Ordered by popularity distance to the root.
    pub neighbors: Vec<Neighbor>,
    pub total_found: usize,
}

/// Node weight of an exported neighborhood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistNode {
    pub id: String,
    pub name: String,
    pub popularity: u32,
}

impl fmt::Display for ArtistNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.popularity)
    }
}

impl NeighborhoodGraph {
    /// Export as a star graph: the root at index 0 with one edge per
    /// neighbor, weighted by relevance.
    #[must_use]
    pub fn to_graph(&self) -> DiGraph<ArtistNode, f64> {
        let mut graph = DiGraph::with_capacity(self.neighbors.len() + 1, self.neighbors.len());
        let root = graph.add_node(ArtistNode {
            id: self.root.id.clone(),
            name: self.root.name.clone(),
            popularity: self.root.popularity,
        });
        for neighbor in &self.neighbors {
            let node = graph.add_node(ArtistNode {
                id: neighbor.id.clone(),
                name: neighbor.name.clone(),
                popularity: neighbor.popularity,
            });
            graph.add_edge(root, node, neighbor.relevance_score);
        }
        graph
    }

    /// Index of the root node in [`Self::to_graph`].
    #[must_use]
    pub fn root_index() -> NodeIndex {
        NodeIndex::new(0)
    }
}

/// Genres the crawl works from: the root's own, or its lowercased name
/// when it has none.
#[must_use]
pub fn effective_genres(root: &ArtistProfile) -> Vec<String> {
    if root.genres.is_empty() {
        vec![root.name.to_lowercase()]
    } else {
        root.genres.clone()
    }
}

/// The deduplicated, order-preserving query plan for `root`.
#[must_use]
pub fn crawl_queries(root: &ArtistProfile, tuning: &Tuning) -> Vec<Query> {
    let genres = effective_genres(root);
    let crawl = &tuning.crawl;

    let planned = genres
        .iter()
        .take(crawl.genre_queries)
        .map(|g| Query::Genre(g.clone()))
        .chain(std::iter::once(Query::Name(root.name.clone())))
        .chain(
            genres
                .iter()
                .take(crawl.adjacency_genres)
                .flat_map(|g| tuning.adjacent_genres(g))
                .map(|kw| Query::Genre(kw.clone())),
        );

    let mut seen = HashSet::new();
    planned.filter(|q| seen.insert(q.clone())).collect()
}

/// Relevance of `candidate` to a root with `root_genres` and `root_popularity`.
#[must_use]
pub fn relevance(
    candidate: &ArtistProfile,
    root_genres: &[String],
    root_popularity: u32,
    crawl: &CrawlTuning,
) -> f64 {
    let root_set: HashSet<&str> = root_genres.iter().map(String::as_str).collect();
    let shared = candidate
        .genres
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(&root_set)
        .count();
    let genre_score = shared as f64 / root_genres.len().max(1) as f64;
    let popularity_distance = f64::from(candidate.popularity.abs_diff(root_popularity)) / 100.0;
    round_to(
        crawl.genre_weight * genre_score + crawl.popularity_weight * (1.0 - popularity_distance),
        3,
    )
}

/// Crawl the neighborhood of `artist_id`, keeping at most `max_artists`.
pub async fn build_neighborhood<M>(
    provider: &M,
    artist_id: &str,
    max_artists: usize,
    tuning: &Tuning,
) -> GraphResult<NeighborhoodGraph>
where
    M: MetadataProvider + ?Sized,
{
    let root = provider
        .artist(artist_id)
        .await
        .map_err(|source| GraphError::ArtistUnresolved {
            id: artist_id.to_string(),
            source,
        })?;
    info!(
        "building neighborhood for {} (genres: {:?}, popularity {})",
        root.name, root.genres, root.popularity
    );

    let crawl = &tuning.crawl;
    let genres = effective_genres(&root);
    let mut seen: HashSet<String> = HashSet::from([root.id.clone(), artist_id.to_string()]);
    let mut candidates = Vec::new();

    for query in crawl_queries(&root, tuning) {
        let results = match &query {
            Query::Genre(genre) => provider.search_by_genre(genre, crawl.page_size).await,
            Query::Name(name) => provider.search_by_name(name, crawl.page_size).await,
        };
        let artists = match results {
            Ok(artists) => artists,
            Err(e) => {
                warn!("search error for '{query}': {e}");
                continue;
            }
        };
        debug!("'{query}' returned {} artists", artists.len());

        for artist in artists {
            if !seen.insert(artist.id.clone()) {
                continue;
            }
            if artist.popularity < crawl.min_popularity {
                continue;
            }
            let relevance_score = relevance(&artist, &genres, root.popularity, crawl);
            candidates.push(Neighbor {
                id: artist.id,
                name: artist.name,
                genres: artist.genres,
                popularity: artist.popularity,
                followers: artist.followers,
                image: artist.image,
                matched_genre: query.text().to_string(),
                relevance_score,
            });
        }
    }

    candidates.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    candidates.truncate(max_artists);
    candidates.sort_by_key(|n| n.popularity.abs_diff(root.popularity));

    info!(
        "neighborhood complete: {} artists around {}",
        candidates.len(),
        root.name
    );
    Ok(NeighborhoodGraph {
        root,
        total_found: candidates.len(),
        neighbors: candidates,
    })
}
