//! Integration tests for the neighborhood crawler, the sonic twin matcher
//! and the discovered-on mapper against an in-memory catalog.

mod common;

use std::collections::HashSet;

use algorhythm_core::{ArtistProfile, AudioFeatures, Feature, FeatureVector, Tuning};
use algorhythm_graph::{
    build_neighborhood, discovered_on, find_sonic_twins, GraphError, NeighborhoodGraph,
};
use common::{playlist, StubCatalog};

fn target_vector() -> FeatureVector {
    FeatureVector::new([0.7, 0.8, -5.0, 0.05, 0.1, 0.0, 0.12, 0.6, 120.0])
}

fn features(vector: FeatureVector) -> Option<AudioFeatures> {
    Some(AudioFeatures::from(vector))
}

/// Root "Nova" (rap, trap; popularity 60) and five candidate artists.
fn catalog() -> StubCatalog {
    let target = target_vector();
    StubCatalog::default()
        .with_artist(
            ArtistProfile::new("r1", "Nova")
                .with_genres(["rap", "trap"])
                .with_popularity(60),
        )
        .with_artist(
            ArtistProfile::new("a1", "Ace")
                .with_genres(["rap", "trap"])
                .with_popularity(62),
        )
        .with_artist(
            ArtistProfile::new("a2", "Bee")
                .with_genres(["rap"])
                .with_popularity(40),
        )
        .with_artist(
            ArtistProfile::new("a3", "Cee")
                .with_genres(["pop"])
                .with_popularity(5),
        )
        .with_artist(
            ArtistProfile::new("a4", "Dee")
                .with_genres(["hip hop"])
                .with_popularity(70),
        )
        .with_artist(
            ArtistProfile::new("a5", "Eve")
                .with_genres(["trap", "drill"])
                .with_popularity(55),
        )
        .genre_hit("rap", &["a1", "a2", "r1", "a3"])
        .genre_hit("trap", &["a1", "a5"])
        .name_hit("Nova", &["r1", "a4"])
        .failing("hip hop")
        .genre_hit("r&b", &["a2"])
        .genre_hit("drill", &["a5"])
        .with_track("t0", "Target", "Nova", features(target))
        .with_track("t1", "Mirror", "Ace", features(target))
        .with_track(
            "t2",
            "Close",
            "Ace",
            features(target.with(Feature::Tempo, 130.0)),
        )
        .with_track(
            "t3",
            "Fast",
            "Eve",
            features(target.with(Feature::Tempo, 170.0)),
        )
        .with_track("t4", "Silent", "Dee", None)
        .top("a1", &["t1", "t2"])
        .top("a5", &["t3"])
        .top("a4", &["t4"])
        .failing("a2")
}

fn ids(graph: &NeighborhoodGraph) -> Vec<&str> {
    graph.neighbors.iter().map(|n| n.id.as_str()).collect()
}

#[tokio::test]
async fn test_neighborhood_ranks_and_caps() {
    let graph = build_neighborhood(&catalog(), "r1", 3, &Tuning::default())
        .await
        .unwrap();

    // Top three by relevance, then presented by popularity distance.
    assert_eq!(ids(&graph), ["a1", "a5", "a2"]);
    assert_eq!(graph.total_found, 3);
    assert_eq!(graph.root.name, "Nova");

    let ace = &graph.neighbors[0];
    assert_eq!(ace.relevance_score, 0.992);
    assert_eq!(ace.matched_genre, "rap");
    assert_eq!(graph.neighbors[1].matched_genre, "trap");
}

#[tokio::test]
async fn test_neighborhood_has_no_duplicates_or_root() {
    let graph = build_neighborhood(&catalog(), "r1", 50, &Tuning::default())
        .await
        .unwrap();

    let found = ids(&graph);
    let unique: HashSet<&str> = found.iter().copied().collect();
    assert_eq!(unique.len(), found.len());
    assert!(!unique.contains("r1"));
    // Below the popularity floor.
    assert!(!unique.contains("a3"));
    assert_eq!(found, ["a1", "a5", "a4", "a2"]);
    assert_eq!(graph.neighbors[2].matched_genre, "Nova");
}

#[tokio::test]
async fn test_unresolved_root_is_fatal() {
    let err = build_neighborhood(&catalog(), "missing", 10, &Tuning::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::ArtistUnresolved { ref id, .. } if id == "missing"));
}

#[tokio::test]
async fn test_sonic_twins_rank_by_distance() {
    let catalog = catalog();
    let result = find_sonic_twins(&catalog, &catalog, "t0", "r1", 5, &Tuning::default())
        .await
        .unwrap();

    assert_eq!(result.target.name, "Target");
    assert_eq!(result.target.artist, "Nova");
    // Bee fails to load and Dee has no features.
    assert_eq!(result.total_compared, 2);

    let ace = &result.twins[0];
    assert_eq!(ace.artist_id, "a1");
    assert_eq!(ace.avg_distance, 5.0);
    assert_eq!(ace.min_distance, 0.0);
    assert_eq!(ace.similarity_pct, 95.12);
    assert_eq!(ace.tracks_analyzed, 2);
    assert_eq!(ace.closest_tracks[0].name, "Mirror");
    assert_eq!(ace.closest_tracks[0].distance, 0.0);

    let eve = &result.twins[1];
    assert_eq!(eve.artist_id, "a5");
    assert_eq!(eve.avg_distance, 50.0);
}

#[tokio::test]
async fn test_sonic_twins_truncate_to_top_n() {
    let catalog = catalog();
    let result = find_sonic_twins(&catalog, &catalog, "t0", "r1", 1, &Tuning::default())
        .await
        .unwrap();
    assert_eq!(result.twins.len(), 1);
    assert_eq!(result.total_compared, 2);
}

#[tokio::test]
async fn test_sonic_twins_fatal_errors() {
    let catalog = catalog().with_track("t9", "Ghost", "Nova", None);
    let tuning = Tuning::default();

    let err = find_sonic_twins(&catalog, &catalog, "nope", "r1", 5, &tuning)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::TrackUnresolved { .. }));

    let err = find_sonic_twins(&catalog, &catalog, "t9", "r1", 5, &tuning)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "no audio features found for 'Ghost'");

    let err = find_sonic_twins(&catalog, &catalog, "t0", "missing", 5, &tuning)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Neighborhood(_)));
}

#[tokio::test]
async fn test_sonic_twins_need_neighbors() {
    let catalog = StubCatalog::default()
        .with_artist(ArtistProfile::new("lonely", "Lonely").with_popularity(30))
        .with_track("t0", "Solo", "Lonely", features(target_vector()));
    let err = find_sonic_twins(&catalog, &catalog, "t0", "lonely", 5, &Tuning::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::EmptyNeighborhood));
}

#[tokio::test]
async fn test_discovered_on_orders_by_authority() {
    let catalog = catalog()
        .playlists("Nova", vec![playlist("p1", "spotify"), playlist("p2", "dj")])
        .playlists(
            "Nova mix",
            vec![playlist("p2", "dj"), playlist("p3", "fan"), playlist("p5", "fan")],
        )
        .failing("Nova radio")
        .followers("p1", 500)
        .followers("p2", 5000)
        .followers("p3", 200);

    let found = discovered_on(&catalog, "r1", &Tuning::default()).await.unwrap();

    assert_eq!(found.artist.name, "Nova");
    assert_eq!(found.total_found, 4);
    let order: Vec<&str> = found.playlists.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(order, ["p1", "p2", "p3", "p5"]);
    // A failed follower lookup counts as zero.
    assert_eq!(found.playlists[3].followers, 0);

    let entry: Vec<&str> = found.entry_points.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(entry, ["p1", "p2"]);
    assert!(found.entry_points[0].is_editorial);
}
