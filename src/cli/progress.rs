//! Console rendering of harvest events.
//!
//! Holds at most one progress bar, for the chunked download in flight.

use std::sync::Mutex;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::icons::Mark;
use crate::services::{
    Approval, HarvestEvent, HarvestObserver, LayerOutcome, NoFileReason, SizeSummary,
};
use crate::storage::clean_service_name;

/// Prints harvest progress to stdout.
pub struct ConsoleObserver {
    threshold: usize,
    folder: Option<String>,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    pub fn new(threshold: usize, folder: Option<String>) -> Self {
        Self {
            threshold,
            folder,
            bar: Mutex::new(None),
        }
    }

    /// Print through the active bar, if any, so the bar is not torn.
    fn println(&self, message: String) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(ref bar) = *guard {
                bar.println(message);
                return;
            }
        }
        println!("{}", message);
    }

    fn start_bar(&self, expected: usize) {
        let bar = ProgressBar::new(expected as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("      Progress: [{bar:30.cyan/blue}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.set_message(format!("0% (0/{})", expected));
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish();
            }
        }
    }

    fn size_line(&self, size: &SizeSummary) -> String {
        match size {
            SizeSummary::Empty => format!("   {} Empty layer. Skipping.", Mark::Failed),
            SizeSummary::Known(n) if *n > self.threshold => {
                format!(
                    "   {} LARGE LAYER DETECTED: {} features.",
                    Mark::Caution,
                    style(n).bold()
                )
            }
            SizeSummary::Known(n) => {
                format!("   {} Size: {} features. Auto-downloading...", Mark::Done, n)
            }
            SizeSummary::Unknown(reason) => {
                format!("   {} Could not determine size. ({})", Mark::Unsized, reason)
            }
        }
    }
}

impl HarvestObserver for ConsoleObserver {
    fn on_event(&self, event: &HarvestEvent) {
        match event {
            HarvestEvent::CatalogLoaded { total, matched } => {
                self.println(format!(
                    "{} {} of {} services match the keywords",
                    Mark::Step,
                    matched,
                    total
                ));
            }
            HarvestEvent::ServiceFailed { service, error: e } => {
                self.println(format!(
                    "{} Error scanning service {}: {}",
                    Mark::Failed,
                    service,
                    e
                ));
            }
            HarvestEvent::LayerStarted { layer } => {
                self.println(format!(
                    "\nChecking: [{}] -> {}",
                    style(clean_service_name(&layer.service, self.folder.as_deref())).cyan(),
                    layer.name
                ));
            }
            HarvestEvent::SizeChecked { size, .. } => {
                self.println(self.size_line(size));
            }
            HarvestEvent::Decided { approval, .. } => {
                if matches!(
                    approval,
                    Approval::UserDeclined | Approval::SizeUnknownDeclined
                ) {
                    self.println(format!("   {} Skipped.", Mark::Aside));
                }
            }
            HarvestEvent::ChunkedDownloadStarted { expected, .. } => {
                self.println(format!(
                    "      {} Downloading {} features in batches...",
                    Mark::Step,
                    expected
                ));
                self.start_bar(*expected);
            }
            HarvestEvent::ChunkCompleted {
                received,
                expected,
                percent,
                ..
            } => {
                if let Ok(guard) = self.bar.lock() {
                    if let Some(ref bar) = *guard {
                        bar.set_position(*received as u64);
                        bar.set_message(format!("{}% ({}/{})", percent, received, expected));
                    }
                }
            }
            HarvestEvent::ChunkFailed { offset, error: e, .. } => {
                self.println(format!("      {} Error on batch {}: {}", Mark::Failed, offset, e));
            }
            HarvestEvent::Discrepancy {
                expected,
                received,
                failed_chunks,
                ..
            } => {
                self.finish_bar();
                self.println(format!(
                    "      {} {} of {} features missing ({} failed batches)",
                    Mark::Caution,
                    expected - received,
                    expected,
                    failed_chunks
                ));
            }
            HarvestEvent::UnpaginatedDownloadStarted { .. } => {
                self.println(format!(
                    "      {} Attempting simple download (no count available)...",
                    Mark::Step
                ));
            }
            HarvestEvent::LayerFinished { report } => {
                self.finish_bar();
                match &report.outcome {
                    LayerOutcome::Saved { path, .. } => {
                        println!("      {} Saved to: {}", Mark::Done, path.display());
                    }
                    LayerOutcome::SkippedNoFile(NoFileReason::DownloadEmpty) => {
                        println!("      {} Download resulted in empty file.", Mark::Failed);
                    }
                    LayerOutcome::SkippedNoFile(NoFileReason::DownloadError(e)) => {
                        println!("      {} Download failed: {}", Mark::Failed, e);
                    }
                    LayerOutcome::SkippedNoFile(NoFileReason::SaveFailed(e)) => {
                        println!("      {} Could not save: {}", Mark::Failed, e);
                    }
                    LayerOutcome::EmptyLayer | LayerOutcome::Declined(_) => {}
                }
            }
        }
    }
}
