//! Harvest service: catalog scan, layer inspection and download, in order.
//!
//! Separated from UI concerns - emits events for progress tracking and
//! asks an [`Approver`] whenever a layer needs confirmation.

mod types;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{ConfigError, HarvestConfig};
use crate::feature_server::{filter_services, FeatureServerClient, FeatureServerError, Layer, Service};
use crate::services::approval::{ApprovalRequest, Approver};
use crate::services::download::{DownloadConfig, DownloadService, LayerDocument};
use crate::storage::{layer_filename, write_geojson};

pub use types::{
    Approval, HarvestEvent, HarvestObserver, HarvestReport, LayerOutcome, LayerReport,
    LayerSurvey, NoFileReason, NoopObserver, SizeCheck, SizeSummary, SurveyReport,
};

/// Apply the sizing rule to a size check.
///
/// Returns `None` for an empty layer, which is skipped without asking.
/// Layers at or under `threshold` are approved without consulting the
/// approver.
pub async fn decide(
    layer: &Layer,
    size: &SizeCheck,
    threshold: usize,
    approver: &dyn Approver,
) -> Option<Approval> {
    match size {
        SizeCheck::Empty => None,
        SizeCheck::Known(ids) if ids.len() <= threshold => Some(Approval::AutoApproved),
        SizeCheck::Known(ids) => {
            let request = ApprovalRequest::LargeLayer {
                layer: layer.clone(),
                count: ids.len(),
                threshold,
            };
            Some(if approver.approve(&request).await {
                Approval::UserApproved
            } else {
                Approval::UserDeclined
            })
        }
        SizeCheck::Unknown(reason) => {
            let request = ApprovalRequest::UnknownSize {
                layer: layer.clone(),
                reason: reason.clone(),
            };
            Some(if approver.approve(&request).await {
                Approval::SizeUnknownApproved
            } else {
                Approval::SizeUnknownDeclined
            })
        }
    }
}

/// Runs a harvest against one feature server.
pub struct HarvestService {
    client: FeatureServerClient,
    config: HarvestConfig,
    downloads: DownloadService,
    approver: Arc<dyn Approver>,
    observer: Arc<dyn HarvestObserver>,
}

impl HarvestService {
    /// Create a new harvest service.
    ///
    /// Fails if `config` does not validate.
    pub fn new(
        client: FeatureServerClient,
        config: HarvestConfig,
        approver: Arc<dyn Approver>,
        observer: Arc<dyn HarvestObserver>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let downloads =
            DownloadService::new(client.clone(), DownloadConfig::from(&config), observer.clone());
        Ok(Self {
            client,
            config,
            downloads,
            approver,
            observer,
        })
    }

    /// Scan, inspect and download every matching layer.
    ///
    /// Only a catalog failure is returned as an error; every later failure
    /// is recorded in the report and the harvest moves on.
    pub async fn run(&self) -> Result<HarvestReport, FeatureServerError> {
        let (services_total, services) = self.matching_services().await?;

        let mut report = HarvestReport {
            services_total,
            services_matched: services.len(),
            ..Default::default()
        };

        for service in &services {
            let layers = match self.service_layers(service).await {
                Ok(layers) => layers,
                Err(e) => {
                    report.services_failed.push((service.name.clone(), e));
                    continue;
                }
            };

            for layer in layers {
                let layer_report = self.harvest_layer(layer).await;
                self.observer.on_event(&HarvestEvent::LayerFinished {
                    report: layer_report.clone(),
                });
                report.layers.push(layer_report);
            }
        }

        info!(
            "Harvest finished: {} saved, {} declined, {} empty, {} failed",
            report.saved(),
            report.declined(),
            report.empty(),
            report.failed()
        );
        Ok(report)
    }

    /// Scan and size every matching layer without downloading anything.
    pub async fn survey(&self) -> Result<SurveyReport, FeatureServerError> {
        let (services_total, services) = self.matching_services().await?;

        let mut report = SurveyReport {
            services_total,
            services_matched: services.len(),
            ..Default::default()
        };

        for service in &services {
            let layers = match self.service_layers(service).await {
                Ok(layers) => layers,
                Err(e) => {
                    report.services_failed.push((service.name.clone(), e));
                    continue;
                }
            };

            for layer in layers {
                let size = self.check_size(&layer).await.summary();
                report.layers.push(LayerSurvey { layer, size });
            }
        }

        Ok(report)
    }

    /// Fetch and filter the catalog. Returns the unfiltered count too.
    async fn matching_services(&self) -> Result<(usize, Vec<Service>), FeatureServerError> {
        let services = self.client.fetch_catalog().await?;
        let total = services.len();
        let matched = filter_services(services, &self.config.keywords);

        info!("{} of {} services match the keywords", matched.len(), total);
        self.observer.on_event(&HarvestEvent::CatalogLoaded {
            total,
            matched: matched.len(),
        });
        Ok((total, matched))
    }

    /// List a service's layers; failures are logged and reported, not raised.
    async fn service_layers(&self, service: &Service) -> Result<Vec<Layer>, String> {
        self.client.list_layers(service).await.map_err(|e| {
            warn!("Error scanning service {}: {}", service.name, e);
            self.observer.on_event(&HarvestEvent::ServiceFailed {
                service: service.name.clone(),
                error: e.to_string(),
            });
            e.to_string()
        })
    }

    async fn check_size(&self, layer: &Layer) -> SizeCheck {
        self.observer.on_event(&HarvestEvent::LayerStarted {
            layer: layer.clone(),
        });

        let size = SizeCheck::from_query(self.client.query_object_ids(layer).await);
        if let SizeCheck::Unknown(reason) = &size {
            warn!(
                "Could not determine size of layer {} of {}: {}",
                layer.id, layer.service, reason
            );
        }

        self.observer.on_event(&HarvestEvent::SizeChecked {
            layer: layer.clone(),
            size: size.summary(),
        });
        size
    }

    /// Drive one layer from discovery to a terminal state.
    async fn harvest_layer(&self, layer: Layer) -> LayerReport {
        let size = self.check_size(&layer).await;
        let mut report = LayerReport {
            layer: layer.clone(),
            size: size.summary(),
            approval: None,
            failed_chunks: 0,
            outcome: LayerOutcome::EmptyLayer,
        };

        let Some(approval) = decide(
            &layer,
            &size,
            self.config.large_layer_threshold,
            self.approver.as_ref(),
        )
        .await
        else {
            return report;
        };

        report.approval = Some(approval);
        self.observer.on_event(&HarvestEvent::Decided {
            layer: layer.clone(),
            approval,
        });

        if !approval.proceeds() {
            report.outcome = LayerOutcome::Declined(approval);
            return report;
        }

        let (document, expected) = match size {
            SizeCheck::Known(ids) => {
                let download = self.downloads.download_chunked(&layer, &ids).await;
                report.failed_chunks = download.failed_chunks;
                (
                    LayerDocument::Collection(download.collection),
                    Some(download.expected),
                )
            }
            _ => match self.downloads.download_unpaginated(&layer).await {
                Ok(raw) => (LayerDocument::Raw(raw), None),
                Err(e) => {
                    report.outcome =
                        LayerOutcome::SkippedNoFile(NoFileReason::DownloadError(e.to_string()));
                    return report;
                }
            },
        };

        report.outcome = self.save(&layer, &document, expected);
        report
    }

    fn save(&self, layer: &Layer, document: &LayerDocument, expected: Option<usize>) -> LayerOutcome {
        let features = document.feature_count();
        if features == 0 {
            warn!(
                "Download of layer {} of {} resulted in an empty file",
                layer.id, layer.service
            );
            return LayerOutcome::SkippedNoFile(NoFileReason::DownloadEmpty);
        }

        let filename = layer_filename(
            &layer.service,
            self.config.folder.as_deref(),
            layer.id,
            &layer.name,
        );

        match write_geojson(&self.config.output_dir, &filename, document) {
            Ok(path) => {
                info!("Saved {} features to {}", features, path.display());
                LayerOutcome::Saved {
                    path,
                    features,
                    expected,
                }
            }
            Err(e) => {
                warn!("Failed to save {}: {}", filename, e);
                LayerOutcome::SkippedNoFile(NoFileReason::SaveFailed(e.to_string()))
            }
        }
    }
}
