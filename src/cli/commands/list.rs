//! List matching layers and their sizes.

use std::sync::Arc;

use console::style;

use crate::cli::helpers::build_harvest_service;
use crate::cli::icons::Mark;
use crate::config::HarvestConfig;
use crate::services::{ApprovalPolicy, NoopObserver, SizeSummary};
use crate::storage::clean_service_name;

/// Scan the catalog and print every matching layer with its feature count.
pub async fn cmd_list(config: &HarvestConfig) -> anyhow::Result<()> {
    let service = build_harvest_service(
        config,
        Arc::new(ApprovalPolicy::AutoDeny),
        Arc::new(NoopObserver),
    )?;

    let report = match service.survey().await {
        Ok(report) => report,
        Err(e) => {
            println!("{} Error connecting to server: {}", Mark::Failed, e);
            return Ok(());
        }
    };

    println!(
        "{} {} of {} services match, {} layers",
        Mark::Step,
        report.services_matched,
        report.services_total,
        report.layers.len()
    );

    for row in &report.layers {
        let service = clean_service_name(&row.layer.service, config.folder.as_deref());
        let size = match &row.size {
            SizeSummary::Known(n) if *n > config.large_layer_threshold => {
                format!("{} {} features (large)", Mark::Caution, style(n).bold())
            }
            SizeSummary::Known(n) => format!("{} features", n),
            SizeSummary::Empty => "empty".to_string(),
            SizeSummary::Unknown(reason) => format!("{} unknown ({})", Mark::Unsized, reason),
        };
        println!(
            "  [{}] L{} {}: {}",
            style(service).cyan(),
            row.layer.id,
            row.layer.name,
            size
        );
    }

    for (service, e) in &report.services_failed {
        println!("  {} {}: {}", Mark::Failed, service, e);
    }

    Ok(())
}
