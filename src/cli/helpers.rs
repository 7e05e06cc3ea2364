//! Shared helper functions for CLI commands.

use std::sync::Arc;

use crate::config::HarvestConfig;
use crate::feature_server::{Endpoints, FeatureServerClient};
use crate::http_client::{resolve_user_agent, HttpClient};
use crate::services::{Approver, HarvestObserver, HarvestService};

/// Build a feature-server client from the effective configuration.
pub fn build_client(config: &HarvestConfig) -> anyhow::Result<FeatureServerClient> {
    let user_agent = resolve_user_agent(config.user_agent.as_deref());
    let http = HttpClient::new(&user_agent, config.request_timeout())?;
    let endpoints = Endpoints::new(&config.base_url, config.folder.as_deref());
    Ok(FeatureServerClient::new(http, endpoints))
}

/// Build the harvest service with the given approval and output handling.
pub fn build_harvest_service(
    config: &HarvestConfig,
    approver: Arc<dyn Approver>,
    observer: Arc<dyn HarvestObserver>,
) -> anyhow::Result<HarvestService> {
    let client = build_client(config)?;
    Ok(HarvestService::new(
        client,
        config.clone(),
        approver,
        observer,
    )?)
}
