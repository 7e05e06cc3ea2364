//! Download matching layers command.

use std::sync::Arc;

use console::style;

use crate::cli::helpers::build_harvest_service;
use crate::cli::icons::Mark;
use crate::cli::progress::ConsoleObserver;
use crate::cli::prompt::TerminalApprover;
use crate::config::HarvestConfig;
use crate::services::{ApprovalPolicy, Approver, HarvestReport};

/// Scan the catalog and download every matching layer.
///
/// `policy` of `None` asks on the terminal for large or unsized layers.
pub async fn cmd_download(
    config: &HarvestConfig,
    policy: Option<ApprovalPolicy>,
) -> anyhow::Result<()> {
    let approver: Arc<dyn Approver> = match policy {
        Some(policy) => Arc::new(policy),
        None => Arc::new(TerminalApprover),
    };
    let observer = Arc::new(ConsoleObserver::new(
        config.large_layer_threshold,
        config.folder.clone(),
    ));
    let service = build_harvest_service(config, approver, observer)?;

    println!(
        "--- Smart Downloader (CRS: {}) ---",
        style(config.spatial_reference).bold()
    );
    println!(
        "--- Auto-downloading layers under {} features ---",
        config.large_layer_threshold
    );

    let report = match service.run().await {
        Ok(report) => report,
        Err(e) => {
            println!("{} Error connecting to server: {}", Mark::Failed, e);
            return Ok(());
        }
    };

    print_summary(&report);
    println!("\nAll done!");
    Ok(())
}

fn print_summary(report: &HarvestReport) {
    println!(
        "\n{} {} of {} services matched, {} layers checked",
        Mark::Done,
        report.services_matched,
        report.services_total,
        report.layers.len()
    );
    println!("  {} {} saved", Mark::Aside, report.saved());

    if report.empty() > 0 {
        println!("  {} {} empty", Mark::Aside, report.empty());
    }
    if report.declined() > 0 {
        println!("  {} {} skipped by choice", Mark::Aside, report.declined());
    }
    if report.failed() > 0 {
        println!("  {} {} produced no file", Mark::Caution, report.failed());
    }
    if !report.services_failed.is_empty() {
        println!(
            "  {} {} services could not be scanned",
            Mark::Caution,
            report.services_failed.len()
        );
    }

    for layer in report.layers.iter().filter(|l| l.missing_features() > 0) {
        println!(
            "  {} {} layer {} ({}): {} features missing",
            Mark::Caution,
            layer.layer.service,
            layer.layer.id,
            layer.layer.name,
            layer.missing_features()
        );
    }
}
