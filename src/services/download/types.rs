//! Download service types.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::config::HarvestConfig;
use crate::feature_server::FeatureCollection;

/// Configuration for the download service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    pub chunk_size: usize,
    pub inter_chunk_delay: Duration,
    pub spatial_reference: u32,
}

impl From<&HarvestConfig> for DownloadConfig {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            inter_chunk_delay: config.inter_chunk_delay(),
            spatial_reference: config.spatial_reference,
        }
    }
}

/// Result of a chunked download.
#[derive(Debug, Clone)]
pub struct ChunkedDownload {
    pub collection: FeatureCollection,
    /// Number of object IDs requested.
    pub expected: usize,
    pub failed_chunks: usize,
}

impl ChunkedDownload {
    pub fn received(&self) -> usize {
        self.collection.len()
    }

    /// IDs that did not come back as features.
    pub fn missing(&self) -> usize {
        self.expected.saturating_sub(self.received())
    }
}

/// A downloaded layer, ready to be written.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LayerDocument {
    /// Assembled from chunks.
    Collection(FeatureCollection),
    /// Unpaginated response, kept as the server sent it.
    Raw(Value),
}

impl LayerDocument {
    pub fn feature_count(&self) -> usize {
        match self {
            LayerDocument::Collection(c) => c.len(),
            LayerDocument::Raw(value) => value
                .get("features")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
        }
    }
}
