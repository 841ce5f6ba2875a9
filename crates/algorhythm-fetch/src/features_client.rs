//! HTTP audio-feature client.
//!
//! Fetches features in batches from `GET {base}/audio-features?ids=a,b,...`.
//! The service answers with its own ids, so each row is mapped back to the
//! catalog track id through its `href`.

use std::time::Duration;

use async_trait::async_trait;
use backon::Retryable;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use algorhythm_core::{entity_id_from_url, AudioFeatures, FeatureProvider, ProviderResult};

use crate::error::{FetchError, FetchResult};
use crate::resilience::{retry_policy, RateLimiter};

/// Maximum ids per request.
pub const BATCH_SIZE: usize = 20;

const SOURCE_NAME: &str = "features";

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    content: Vec<FeatureRow>,
}

#[derive(Debug, Deserialize)]
struct FeatureRow {
    #[serde(default)]
    href: String,
    #[serde(flatten)]
    features: AudioFeatures,
}

/// Decode one batch response into `(track id, features)` pairs.
///
/// Rows without an `href` cannot be matched to a track and are dropped.
pub fn decode_batch(body: &str) -> FetchResult<Vec<(String, AudioFeatures)>> {
    let response: BatchResponse = serde_json::from_str(body).map_err(|e| FetchError::Parse {
        source_name: SOURCE_NAME.to_string(),
        message: e.to_string(),
    })?;
    Ok(response
        .content
        .into_iter()
        .filter(|row| !row.href.is_empty())
        .map(|row| (entity_id_from_url(&row.href).to_string(), row.features))
        .collect())
}

/// Rate-limited, retrying client for the audio-feature service.
#[derive(Debug, Clone)]
pub struct FeaturesClient {
    http: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    max_retries: usize,
}

impl FeaturesClient {
    pub fn new(base_url: impl Into<String>) -> FetchResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("algorhythm/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::new(5),
            max_retries: 3,
        })
    }

    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.rate_limiter = RateLimiter::new(requests_per_second);
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/audio-features", self.base_url)
    }

    async fn fetch_batch_once(&self, ids: &[String]) -> FetchResult<Vec<(String, AudioFeatures)>> {
        self.rate_limiter.acquire().await;

        let response = self
            .http
            .get(self.endpoint())
            .query(&[("ids", ids.join(","))])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                source_name: SOURCE_NAME.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                source_name: SOURCE_NAME.to_string(),
                message: format!("status {status}"),
            });
        }

        let body = response.text().await?;
        decode_batch(&body)
    }

    /// Fetch one batch, retrying transient failures with backoff.
    pub async fn fetch_batch(&self, ids: &[String]) -> FetchResult<Vec<(String, AudioFeatures)>> {
        (|| self.fetch_batch_once(ids))
            .retry(retry_policy(self.max_retries))
            .when(FetchError::is_transient)
            .notify(|e: &FetchError, delay: Duration| {
                warn!("feature request failed ({e}), retrying in {delay:?}");
            })
            .await
    }
}

#[async_trait]
impl FeatureProvider for FeaturesClient {
    async fn features(&self, track_id: &str) -> ProviderResult<Option<AudioFeatures>> {
        let found = self.fetch_batch(&[track_id.to_string()]).await?;
        Ok(found
            .into_iter()
            .find(|(id, _)| id == track_id)
            .map(|(_, features)| features))
    }

    /// Batches of [`BATCH_SIZE`]; a batch that still fails after retries is
    /// skipped.
    async fn features_for(
        &self,
        track_ids: &[String],
    ) -> ProviderResult<Vec<(String, AudioFeatures)>> {
        let mut found = Vec::with_capacity(track_ids.len());
        for (n, batch) in track_ids.chunks(BATCH_SIZE).enumerate() {
            match self.fetch_batch(batch).await {
                Ok(rows) => {
                    debug!("batch {}: got {}/{} tracks", n + 1, rows.len(), batch.len());
                    found.extend(rows.into_iter().filter(|(id, _)| batch.contains(id)));
                }
                Err(e) => warn!("batch {}: {e}, skipping", n + 1),
            }
        }
        info!("fetched features for {}/{} tracks", found.len(), track_ids.len());
        Ok(found)
    }
}
