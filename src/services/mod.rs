//! Service layer for geoacquire business logic.
//!
//! This module contains domain logic separated from UI concerns.
//! Services report through events and never touch the terminal.

pub mod approval;
pub mod download;
pub mod harvest;

pub use approval::{ApprovalPolicy, ApprovalRequest, Approver};
pub use download::{ChunkedDownload, DownloadConfig, DownloadService, LayerDocument};
pub use harvest::{
    decide, Approval, HarvestEvent, HarvestObserver, HarvestReport, HarvestService,
    LayerOutcome, LayerReport, NoFileReason, NoopObserver, SizeCheck, SizeSummary, SurveyReport,
};
