//! Catalog scanning and service filtering.

use tracing::info;

use super::types::CatalogResponse;
use super::{FeatureServerClient, FeatureServerError, Service};

impl FeatureServerClient {
    /// Fetch every service listed in the catalog (one request).
    pub async fn fetch_catalog(&self) -> Result<Vec<Service>, FeatureServerError> {
        let url = self.endpoints.catalog_url();
        info!("Fetching service catalog: {}", url);

        let catalog: CatalogResponse = self.get_json(&url, &[("f", "json".into())]).await?;

        info!("Catalog lists {} services", catalog.services.len());
        Ok(catalog.services)
    }
}

/// Check if a service name contains any keyword, ignoring case.
pub fn matches_keywords(name: &str, keywords: &[String]) -> bool {
    let name = name.to_lowercase();
    keywords
        .iter()
        .any(|keyword| name.contains(&keyword.to_lowercase()))
}

/// Keep feature services whose name matches a keyword, in catalog order.
pub fn filter_services(services: Vec<Service>, keywords: &[String]) -> Vec<Service> {
    services
        .into_iter()
        .filter(|s| matches_keywords(&s.name, keywords) && s.is_feature_server())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matches_keywords_case_insensitive() {
        let kw = keywords(&["Checkpoint", "West Bank"]);
        assert!(matches_keywords("Hosted/gaza_CHECKPOINTS", &kw));
        assert!(matches_keywords("Hosted/west bank barrier", &kw));
        assert!(!matches_keywords("Hosted/Schools", &kw));
    }

    #[test]
    fn test_matches_keywords_empty_list() {
        assert!(!matches_keywords("Hosted/Roads", &[]));
    }

    #[test]
    fn test_filter_services_requires_feature_server() {
        let services = vec![
            Service::new("Hosted/Gaza_Roads", "FeatureServer"),
            Service::new("Hosted/Gaza_Imagery", "MapServer"),
            Service::new("Hosted/Schools", "FeatureServer"),
            Service::new("Hosted/Road_Closures", "FeatureServer"),
        ];

        let kept = filter_services(services, &keywords(&["road", "gaza"]));
        let names: Vec<&str> = kept.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Hosted/Gaza_Roads", "Hosted/Road_Closures"]);
    }
}
