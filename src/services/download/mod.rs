//! Layer download service.
//!
//! Two strategies: chunked by object ID when the ID list is known, and a
//! single unpaginated request when it is not. Failures are logged and
//! reported as events; nothing here aborts a harvest.

mod types;

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::feature_server::{
    chunk_ids, FeatureCollection, FeatureServerClient, FeatureServerError, Layer,
};
use crate::services::harvest::{HarvestEvent, HarvestObserver};

pub use types::{ChunkedDownload, DownloadConfig, LayerDocument};

/// Service for downloading layer features.
pub struct DownloadService {
    client: FeatureServerClient,
    config: DownloadConfig,
    observer: Arc<dyn HarvestObserver>,
}

impl DownloadService {
    /// Create a new download service.
    pub fn new(
        client: FeatureServerClient,
        config: DownloadConfig,
        observer: Arc<dyn HarvestObserver>,
    ) -> Self {
        Self {
            client,
            config,
            observer,
        }
    }

    /// Download a layer in windows of `chunk_size` object IDs.
    ///
    /// Issues exactly `ceil(ids.len() / chunk_size)` requests. A failed
    /// chunk is skipped, so the result may hold fewer features than IDs.
    pub async fn download_chunked(&self, layer: &Layer, ids: &[i64]) -> ChunkedDownload {
        let spatial_reference = self.config.spatial_reference;
        self.download_chunks_with(layer, ids, move |chunk| {
            self.client
                .query_features_by_ids(layer, chunk, spatial_reference)
        })
        .await
    }

    /// Chunk loop of [`download_chunked`](Self::download_chunked), with the
    /// per-chunk request supplied by `fetch`.
    async fn download_chunks_with<'a, F, Fut>(
        &self,
        layer: &Layer,
        ids: &'a [i64],
        mut fetch: F,
    ) -> ChunkedDownload
    where
        F: FnMut(&'a [i64]) -> Fut,
        Fut: Future<Output = Result<Vec<Value>, FeatureServerError>>,
    {
        let expected = ids.len();
        self.observer.on_event(&HarvestEvent::ChunkedDownloadStarted {
            layer: layer.clone(),
            expected,
        });

        let mut features = Vec::with_capacity(expected);
        let mut failed_chunks = 0;

        for (index, chunk) in chunk_ids(ids, self.config.chunk_size).enumerate() {
            if index > 0 && !self.config.inter_chunk_delay.is_zero() {
                tokio::time::sleep(self.config.inter_chunk_delay).await;
            }

            match fetch(chunk).await {
                Ok(batch) => {
                    debug!("Chunk {} returned {} features", index, batch.len());
                    features.extend(batch);
                    self.observer.on_event(&HarvestEvent::ChunkCompleted {
                        index,
                        received: features.len(),
                        expected,
                        percent: percent(features.len(), expected),
                    });
                }
                Err(e) => {
                    let offset = index * self.config.chunk_size;
                    warn!(
                        "Error on batch {} (ids from offset {}) of {}: {}",
                        index, offset, layer.service, e
                    );
                    failed_chunks += 1;
                    self.observer.on_event(&HarvestEvent::ChunkFailed {
                        index,
                        offset,
                        error: e.to_string(),
                    });
                }
            }
        }

        let download = ChunkedDownload {
            collection: FeatureCollection::new(features),
            expected,
            failed_chunks,
        };

        if download.missing() > 0 {
            warn!(
                "Layer {} of {}: {} of {} features missing after {} failed chunks",
                layer.id,
                layer.service,
                download.missing(),
                expected,
                failed_chunks
            );
            self.observer.on_event(&HarvestEvent::Discrepancy {
                layer: layer.clone(),
                expected,
                received: download.received(),
                failed_chunks,
            });
        }

        download
    }

    /// Download a whole layer in one request.
    ///
    /// Returns the raw response document as the server sent it.
    pub async fn download_unpaginated(
        &self,
        layer: &Layer,
    ) -> Result<Value, FeatureServerError> {
        self.observer
            .on_event(&HarvestEvent::UnpaginatedDownloadStarted {
                layer: layer.clone(),
            });

        self.client
            .query_all_features(layer, self.config.spatial_reference)
            .await
            .inspect_err(|e| {
                warn!(
                    "Unpaginated download of layer {} of {} failed: {}",
                    layer.id, layer.service, e
                )
            })
    }
}

/// Integer percentage of `received` over `expected`.
fn percent(received: usize, expected: usize) -> u64 {
    if expected == 0 {
        return 100;
    }
    (received as u64 * 100) / expected as u64
}
