//! Layer listing and ID-only size queries.

use tracing::debug;

use super::types::{LayerListResponse, ObjectIdsResponse};
use super::{query, FeatureServerClient, FeatureServerError, Layer, Service};

impl FeatureServerClient {
    /// List the layers of a feature service (one request).
    pub async fn list_layers(&self, service: &Service) -> Result<Vec<Layer>, FeatureServerError> {
        let url = self.endpoints.service_url(&service.name);
        let listing: LayerListResponse = self.get_json(&url, &[("f", "json".into())]).await?;

        let layers = listing
            .layers
            .ok_or(FeatureServerError::MissingField("layers"))?;

        debug!("Service {} has {} layers", service.name, layers.len());
        Ok(layers
            .into_iter()
            .map(|info| Layer {
                id: info.id,
                name: info.name,
                service: service.name.clone(),
            })
            .collect())
    }

    /// Fetch every object ID in a layer via `returnIdsOnly`.
    ///
    /// The ID list is returned in server order and is the authoritative
    /// feature count.
    pub async fn query_object_ids(&self, layer: &Layer) -> Result<Vec<i64>, FeatureServerError> {
        let url = self.endpoints.query_url(layer);
        let response: ObjectIdsResponse = self.get_json(&url, &query::id_query_params()).await?;

        response
            .object_ids
            .ok_or(FeatureServerError::IdQueryUnsupported)
    }
}
