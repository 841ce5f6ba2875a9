pub mod config;
pub mod discovered;
pub mod dna;
pub mod neighborhood;
pub mod score;
pub mod twins;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use algorhythm_core::{entity_id_from_url, FeatureProvider, MetadataProvider, Track, Tuning};
use algorhythm_dna::Session;
use algorhythm_fetch::{Config, FeaturesClient, JsonCatalog};

/// Everything a command needs: the catalog, the feature source and the
/// tuning tables.
pub struct Context {
    pub catalog: Arc<JsonCatalog>,
    pub features: Arc<dyn FeatureProvider>,
    pub tuning: Tuning,
    pub json: bool,
}

impl Context {
    pub fn open(
        config: Config,
        catalog_path: Option<PathBuf>,
        tuning_path: Option<PathBuf>,
        json: bool,
    ) -> Result<Self> {
        let catalog_path = catalog_path.unwrap_or(config.catalog_path);
        let catalog = Arc::new(JsonCatalog::load(&catalog_path)?);

        let features: Arc<dyn FeatureProvider> = match &config.features_api_base {
            Some(base) => {
                log::info!("fetching audio features from {base}");
                Arc::new(FeaturesClient::new(base.as_str())?)
            }
            None => Arc::clone(&catalog) as Arc<dyn FeatureProvider>,
        };

        let tuning = match tuning_path.or(config.tuning_path) {
            Some(path) => Tuning::load(&path)
                .with_context(|| format!("Failed to load tuning from {}", path.display()))?,
            None => Tuning::default(),
        };

        Ok(Self {
            catalog,
            features,
            tuning,
            json,
        })
    }

    /// Print `value` as pretty JSON when `--json` was given.
    ///
    /// Returns false when the caller should print its text form instead.
    pub fn emit_json<T: Serialize>(&self, value: &T) -> Result<bool> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(self.json)
    }

    /// Load a playlist's tracks with their features into a new session.
    ///
    /// Tracks without features are dropped; playlist order is kept, and a
    /// track listed twice contributes two rows.
    pub async fn load_session(&self, playlist: &str) -> Result<Session> {
        let playlist_id = entity_id_from_url(playlist);
        let playlist = self
            .catalog
            .playlist(playlist_id)
            .with_context(|| format!("Unknown playlist: {playlist_id}"))?;

        let found: HashMap<String, _> = self
            .features
            .features_for(&playlist.tracks)
            .await
            .context("Failed to fetch audio features")?
            .into_iter()
            .collect();

        let mut tracks = Vec::with_capacity(playlist.tracks.len());
        for id in &playlist.tracks {
            let Some(features) = found.get(id).cloned() else {
                continue;
            };
            let summary = self.catalog.track(id).await?;
            tracks.push(Track::new(id.clone(), summary.name, summary.artist, features));
        }
        log::info!(
            "[{}] {} of {} tracks have audio features",
            playlist.summary.name,
            tracks.len(),
            playlist.tracks.len()
        );

        Ok(Session::new(playlist.summary.name.clone(), tracks))
    }

    /// Resolve a track and its features.
    pub async fn candidate(&self, track: &str) -> Result<Track> {
        let track_id = entity_id_from_url(track);
        let summary = self
            .catalog
            .track(track_id)
            .await
            .with_context(|| format!("Unknown track: {track_id}"))?;
        let features = self
            .features
            .features(track_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("no audio features found for '{}'", summary.name))?;
        Ok(Track::new(track_id, summary.name, summary.artist, features))
    }
}
