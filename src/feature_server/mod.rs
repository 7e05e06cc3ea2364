//! ArcGIS feature-server REST client.
//!
//! Covers the small slice of the REST dialect needed to enumerate a catalog,
//! list a service's layers, count a layer via an ID-only query and pull
//! features as GeoJSON.

mod catalog;
mod error;
mod layers;
mod query;
mod types;

pub use catalog::{filter_services, matches_keywords};
pub use error::FeatureServerError;
pub use query::{chunk_ids, Endpoints};
pub use types::{FeatureCollection, Layer, Service, FEATURE_SERVER};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::http_client::HttpClient;
use types::RemoteErrorBody;

/// Client for one feature-server root.
#[derive(Clone)]
pub struct FeatureServerClient {
    http: HttpClient,
    endpoints: Endpoints,
}

impl FeatureServerClient {
    pub fn new(http: HttpClient, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    /// GET a URL and return the decoded JSON body.
    ///
    /// Non-2xx statuses and ArcGIS `{"error": ...}` bodies become errors.
    async fn get_value(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, FeatureServerError> {
        let response = self.http.get(url, query).await?;
        if !response.is_success() {
            return Err(FeatureServerError::HttpStatus {
                status: response.status,
                url: response.url.clone(),
            });
        }

        let url = response.url.clone();
        let content_type = response.content_type().map(str::to_string);
        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body).map_err(|source| {
            debug!("Undecodable body from {} (content type {:?})", url, content_type);
            FeatureServerError::Decode { url, source }
        })?;

        if let Some(error) = value.get("error") {
            let remote: RemoteErrorBody =
                serde_json::from_value(error.clone()).unwrap_or(RemoteErrorBody {
                    code: 0,
                    message: error.to_string(),
                });
            return Err(FeatureServerError::Remote {
                code: remote.code,
                message: remote.message,
            });
        }

        Ok(value)
    }

    /// GET a URL and deserialize the JSON body into `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FeatureServerError> {
        let value = self.get_value(url, query).await?;
        serde_json::from_value(value).map_err(|source| FeatureServerError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
