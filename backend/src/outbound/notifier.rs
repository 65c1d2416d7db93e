//! Structured-log adapter for the `WorkflowNotifier` port.
//!
//! Each event becomes one `info` record under the `lostfound::workflow`
//! target with the identifiers as fields, so a log shipper can route claim
//! activity without parsing messages.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{WorkflowEvent, WorkflowNotifier};

/// Emits workflow events as structured log records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWorkflowNotifier;

#[async_trait]
impl WorkflowNotifier for TracingWorkflowNotifier {
    async fn notify(&self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::ItemReported { item_id, reporter } => {
                info!(target: "lostfound::workflow", %item_id, %reporter, "item reported");
            }
            WorkflowEvent::RequestFiled {
                request_id,
                item_id,
                requester,
            } => {
                info!(
                    target: "lostfound::workflow",
                    %request_id,
                    %item_id,
                    %requester,
                    "claim request filed"
                );
            }
            WorkflowEvent::RequestApproved {
                request_id,
                item_id,
                requester,
            } => {
                info!(
                    target: "lostfound::workflow",
                    %request_id,
                    %item_id,
                    %requester,
                    "claim request approved"
                );
            }
            WorkflowEvent::RequestRejected {
                request_id,
                item_id,
                requester,
            } => {
                info!(
                    target: "lostfound::workflow",
                    %request_id,
                    %item_id,
                    %requester,
                    "claim request rejected"
                );
            }
        }
    }
}
