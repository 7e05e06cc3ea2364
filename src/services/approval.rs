//! Approval gate for layers that need an explicit go-ahead.
//!
//! The harvest never reads the terminal itself; it asks an [`Approver`].
//! The CLI supplies an interactive one, tests and unattended runs use an
//! [`ApprovalPolicy`].

use async_trait::async_trait;

use crate::feature_server::Layer;

/// Why a layer needs approval before it is downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalRequest {
    /// The layer has more features than the configured threshold.
    LargeLayer {
        layer: Layer,
        count: usize,
        threshold: usize,
    },
    /// The feature count could not be determined; approval means a single
    /// unpaginated fetch.
    UnknownSize { layer: Layer, reason: String },
}

impl ApprovalRequest {
    pub fn layer(&self) -> &Layer {
        match self {
            ApprovalRequest::LargeLayer { layer, .. } | ApprovalRequest::UnknownSize { layer, .. } => {
                layer
            }
        }
    }

    /// Question shown to an operator.
    pub fn question(&self) -> &'static str {
        match self {
            ApprovalRequest::LargeLayer { .. } => "Do you want to download this huge layer?",
            ApprovalRequest::UnknownSize { .. } => "Download anyway?",
        }
    }
}

/// Decides whether a flagged layer is downloaded.
#[async_trait]
pub trait Approver: Send + Sync {
    async fn approve(&self, request: &ApprovalRequest) -> bool;
}

/// Non-interactive approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalPolicy {
    AutoApprove,
    AutoDeny,
}

#[async_trait]
impl Approver for ApprovalPolicy {
    async fn approve(&self, request: &ApprovalRequest) -> bool {
        let approved = matches!(self, ApprovalPolicy::AutoApprove);
        tracing::info!(
            "{} layer {} of {} by policy",
            if approved { "Approved" } else { "Declined" },
            request.layer().id,
            request.layer().service
        );
        approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ApprovalRequest {
        ApprovalRequest::LargeLayer {
            layer: Layer {
                id: 1,
                name: "Roads".to_string(),
                service: "Hosted/Roads".to_string(),
            },
            count: 200_000,
            threshold: 100_000,
        }
    }

    #[tokio::test]
    async fn test_policies() {
        assert!(ApprovalPolicy::AutoApprove.approve(&request()).await);
        assert!(!ApprovalPolicy::AutoDeny.approve(&request()).await);
    }

    #[test]
    fn test_question_text() {
        assert_eq!(request().question(), "Do you want to download this huge layer?");
    }
}
