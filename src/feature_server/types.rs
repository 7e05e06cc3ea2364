//! Feature-server catalog and layer types.

use serde::{Deserialize, Serialize};

/// Service type string for feature services in an ArcGIS catalog.
pub const FEATURE_SERVER: &str = "FeatureServer";

/// A service listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Full service name, including any folder prefix (`Hosted/Roads`).
    pub name: String,
    /// Service type (`FeatureServer`, `MapServer`, ...).
    #[serde(rename = "type")]
    pub kind: String,
}

impl Service {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Check if this service exposes queryable feature layers.
    pub fn is_feature_server(&self) -> bool {
        self.kind == FEATURE_SERVER
    }
}

/// A layer inside a feature service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub id: i64,
    pub name: String,
    /// Name of the owning service, as listed in the catalog.
    pub service: String,
}

/// Catalog listing: `GET {base}/{folder}?f=json`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CatalogResponse {
    #[serde(default)]
    pub services: Vec<Service>,
}

/// Layer descriptor inside a service listing.
#[derive(Debug, Deserialize)]
pub(crate) struct LayerInfo {
    pub id: i64,
    pub name: String,
}

/// Service listing: `GET {base}/{service}/FeatureServer?f=json`.
#[derive(Debug, Deserialize)]
pub(crate) struct LayerListResponse {
    pub layers: Option<Vec<LayerInfo>>,
}

/// ID-only query response.
#[derive(Debug, Deserialize)]
pub(crate) struct ObjectIdsResponse {
    #[serde(rename = "objectIds")]
    pub object_ids: Option<Vec<i64>>,
}

/// Error body ArcGIS returns with a 200 status.
#[derive(Debug, Deserialize)]
pub(crate) struct RemoteErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// GeoJSON FeatureCollection assembled from chunked downloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<serde_json::Value>,
}

impl FeatureCollection {
    pub fn new(features: Vec<serde_json::Value>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
