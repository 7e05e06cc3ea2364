//! Endpoint composition and feature queries.

use serde_json::Value;

use super::{FeatureServerClient, FeatureServerError, Layer};

/// URL layout of a feature-server root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
    folder: Option<String>,
}

impl Endpoints {
    /// `base_url` is the REST services root, e.g.
    /// `https://gis.example.org/server/rest/services`.
    pub fn new(base_url: &str, folder: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            folder: folder
                .map(|f| f.trim_matches('/').to_string())
                .filter(|f| !f.is_empty()),
        }
    }

    /// Catalog listing endpoint.
    pub fn catalog_url(&self) -> String {
        match &self.folder {
            Some(folder) => format!("{}/{}", self.base_url, folder),
            None => self.base_url.clone(),
        }
    }

    /// `{base}/{serviceName}/FeatureServer`
    pub fn service_url(&self, service_name: &str) -> String {
        format!("{}/{}/FeatureServer", self.base_url, service_name)
    }

    /// `{base}/{serviceName}/FeatureServer/{layerId}/query`
    pub fn query_url(&self, layer: &Layer) -> String {
        format!("{}/{}/query", self.service_url(&layer.service), layer.id)
    }
}

/// Parameters for the ID-only count query.
pub(crate) fn id_query_params() -> Vec<(&'static str, String)> {
    vec![
        ("where", "1=1".to_string()),
        ("returnIdsOnly", "true".to_string()),
        ("f", "json".to_string()),
    ]
}

/// Parameters for one chunk of features selected by object ID.
pub(crate) fn chunk_query_params(ids: &[i64], spatial_reference: u32) -> Vec<(&'static str, String)> {
    let id_list = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");

    vec![
        ("objectIds", id_list),
        ("outFields", "*".to_string()),
        ("f", "geojson".to_string()),
        ("outSR", spatial_reference.to_string()),
    ]
}

/// Parameters for the unpaginated "all records" query.
pub(crate) fn all_records_params(spatial_reference: u32) -> Vec<(&'static str, String)> {
    vec![
        ("where", "1=1".to_string()),
        ("outFields", "*".to_string()),
        ("f", "geojson".to_string()),
        ("outSR", spatial_reference.to_string()),
    ]
}

/// Split an ID sequence into request windows of at most `chunk_size` IDs.
///
/// # Panics
///
/// Panics if `chunk_size` is zero; configuration rejects that value.
pub fn chunk_ids(ids: &[i64], chunk_size: usize) -> std::slice::Chunks<'_, i64> {
    ids.chunks(chunk_size)
}

impl FeatureServerClient {
    /// Fetch the features for one window of object IDs.
    ///
    /// A response without a `features` array yields an empty batch.
    pub async fn query_features_by_ids(
        &self,
        layer: &Layer,
        ids: &[i64],
        spatial_reference: u32,
    ) -> Result<Vec<Value>, FeatureServerError> {
        let url = self.endpoints.query_url(layer);
        let mut document = self
            .get_value(&url, &chunk_query_params(ids, spatial_reference))
            .await?;

        Ok(match document.get_mut("features").map(Value::take) {
            Some(Value::Array(features)) => features,
            _ => Vec::new(),
        })
    }

    /// Fetch the whole layer in one unpaginated request.
    ///
    /// Returns the raw GeoJSON document as the server sent it.
    pub async fn query_all_features(
        &self,
        layer: &Layer,
        spatial_reference: u32,
    ) -> Result<Value, FeatureServerError> {
        let url = self.endpoints.query_url(layer);
        self.get_value(&url, &all_records_params(spatial_reference))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> Layer {
        Layer {
            id: 3,
            name: "Checkpoints".to_string(),
            service: "Hosted/Gaza_Checkpoints".to_string(),
        }
    }

    #[test]
    fn test_endpoints_with_folder() {
        let endpoints = Endpoints::new("https://gis.example.org/server/rest/services/", Some("Hosted"));
        assert_eq!(
            endpoints.catalog_url(),
            "https://gis.example.org/server/rest/services/Hosted"
        );
        assert_eq!(
            endpoints.query_url(&layer()),
            "https://gis.example.org/server/rest/services/Hosted/Gaza_Checkpoints/FeatureServer/3/query"
        );
    }

    #[test]
    fn test_endpoints_without_folder() {
        let endpoints = Endpoints::new("http://localhost:8080/rest/services", Some(""));
        assert_eq!(
            endpoints.catalog_url(),
            "http://localhost:8080/rest/services"
        );
    }

    #[test]
    fn test_chunk_query_params() {
        let params = chunk_query_params(&[1, 2, 3], 4326);
        assert_eq!(params[0], ("objectIds", "1,2,3".to_string()));
        assert!(params.contains(&("outFields", "*".to_string())));
        assert!(params.contains(&("f", "geojson".to_string())));
        assert!(params.contains(&("outSR", "4326".to_string())));
    }

    #[test]
    fn test_id_query_params() {
        let params = id_query_params();
        assert!(params.contains(&("returnIdsOnly", "true".to_string())));
        assert!(params.contains(&("where", "1=1".to_string())));
        assert!(params.contains(&("f", "json".to_string())));
    }

    #[test]
    fn test_chunk_ids_count_and_bounds() {
        let ids: Vec<i64> = (1..=2500).collect();
        let chunks: Vec<&[i64]> = chunk_ids(&ids, 1000).collect();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= 1000));
        assert_eq!(chunks[2], &ids[2000..]);

        let exact: Vec<i64> = (1..=2000).collect();
        assert_eq!(chunk_ids(&exact, 1000).count(), 2);
        assert_eq!(chunk_ids(&[], 1000).count(), 0);
    }
}
