//! Harvest service types and events.

use std::path::PathBuf;

use crate::feature_server::{FeatureServerError, Layer};

/// Events emitted during a harvest, in the order things happen.
#[derive(Debug, Clone)]
pub enum HarvestEvent {
    /// Catalog fetched and filtered
    CatalogLoaded { total: usize, matched: usize },
    /// Layer list of a service could not be read; the service is skipped
    ServiceFailed { service: String, error: String },
    /// Layer inspection started
    LayerStarted { layer: Layer },
    /// ID-only size query finished
    SizeChecked { layer: Layer, size: SizeSummary },
    /// Approver consulted or size rule applied
    Decided { layer: Layer, approval: Approval },
    /// Chunked download started
    ChunkedDownloadStarted { layer: Layer, expected: usize },
    /// One chunk landed
    ChunkCompleted {
        index: usize,
        received: usize,
        expected: usize,
        percent: u64,
    },
    /// One chunk failed; its features are absent from the output
    ChunkFailed {
        index: usize,
        offset: usize,
        error: String,
    },
    /// Chunked download ended with fewer features than IDs
    Discrepancy {
        layer: Layer,
        expected: usize,
        received: usize,
        failed_chunks: usize,
    },
    /// Unpaginated fallback download started
    UnpaginatedDownloadStarted { layer: Layer },
    /// Layer reached a terminal state
    LayerFinished { report: LayerReport },
}

/// Receives harvest events; the CLI renders them, tests record them.
pub trait HarvestObserver: Send + Sync {
    fn on_event(&self, event: &HarvestEvent);
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl HarvestObserver for NoopObserver {
    fn on_event(&self, _event: &HarvestEvent) {}
}

/// Result of the ID-only query for one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeCheck {
    /// Non-empty ID list, in server order.
    Known(Vec<i64>),
    /// The layer has no features.
    Empty,
    /// The query failed or the server does not support it.
    Unknown(String),
}

impl SizeCheck {
    pub fn from_query(result: Result<Vec<i64>, FeatureServerError>) -> Self {
        match result {
            Ok(ids) if ids.is_empty() => SizeCheck::Empty,
            Ok(ids) => SizeCheck::Known(ids),
            Err(e) => SizeCheck::Unknown(e.to_string()),
        }
    }

    pub fn summary(&self) -> SizeSummary {
        match self {
            SizeCheck::Known(ids) => SizeSummary::Known(ids.len()),
            SizeCheck::Empty => SizeSummary::Empty,
            SizeCheck::Unknown(reason) => SizeSummary::Unknown(reason.clone()),
        }
    }
}

/// [`SizeCheck`] without the ID list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeSummary {
    Known(usize),
    Empty,
    Unknown(String),
}

/// Sizing decision for a non-empty layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    /// At or under the threshold
    AutoApproved,
    /// Over the threshold, approved
    UserApproved,
    /// Over the threshold, declined
    UserDeclined,
    /// Size unknown, approved for an unpaginated fetch
    SizeUnknownApproved,
    /// Size unknown, declined
    SizeUnknownDeclined,
}

impl Approval {
    /// Whether a download follows.
    pub fn proceeds(self) -> bool {
        matches!(
            self,
            Approval::AutoApproved | Approval::UserApproved | Approval::SizeUnknownApproved
        )
    }
}

/// Why a downloaded layer produced no file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoFileReason {
    /// The download finished but held no features.
    DownloadEmpty,
    /// The unpaginated request failed outright.
    DownloadError(String),
    /// Writing the file failed.
    SaveFailed(String),
}

/// Terminal state of one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOutcome {
    /// Zero object IDs; nothing to fetch.
    EmptyLayer,
    /// Declined by the approver; no request was issued.
    Declined(Approval),
    /// File written.
    Saved {
        path: PathBuf,
        features: usize,
        /// ID count when known; `features` may be lower after chunk failures.
        expected: Option<usize>,
    },
    /// Download attempted, nothing written.
    SkippedNoFile(NoFileReason),
}

/// Everything that happened to one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerReport {
    pub layer: Layer,
    pub size: SizeSummary,
    pub approval: Option<Approval>,
    pub failed_chunks: usize,
    pub outcome: LayerOutcome,
}

impl LayerReport {
    /// Features listed by the ID query but absent from the saved file.
    pub fn missing_features(&self) -> usize {
        match &self.outcome {
            LayerOutcome::Saved {
                features,
                expected: Some(expected),
                ..
            } => expected.saturating_sub(*features),
            _ => 0,
        }
    }
}

/// Summary of a full harvest.
#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    pub services_total: usize,
    pub services_matched: usize,
    /// Services whose layer list could not be read, with the error.
    pub services_failed: Vec<(String, String)>,
    pub layers: Vec<LayerReport>,
}

impl HarvestReport {
    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, LayerOutcome::Saved { .. }))
    }

    pub fn declined(&self) -> usize {
        self.count(|o| matches!(o, LayerOutcome::Declined(_)))
    }

    pub fn empty(&self) -> usize {
        self.count(|o| matches!(o, LayerOutcome::EmptyLayer))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, LayerOutcome::SkippedNoFile(_)))
    }

    /// Features missing across all saved layers.
    pub fn missing_features(&self) -> usize {
        self.layers.iter().map(LayerReport::missing_features).sum()
    }

    fn count(&self, pred: impl Fn(&LayerOutcome) -> bool) -> usize {
        self.layers.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// One row of a survey: a layer and its size, nothing downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSurvey {
    pub layer: Layer,
    pub size: SizeSummary,
}

/// Result of a survey run.
#[derive(Debug, Clone, Default)]
pub struct SurveyReport {
    pub services_total: usize,
    pub services_matched: usize,
    pub services_failed: Vec<(String, String)>,
    pub layers: Vec<LayerSurvey>,
}
