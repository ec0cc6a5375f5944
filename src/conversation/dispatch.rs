use tracing::{info, warn};

use super::event::EventDescriptor;
use crate::services::calendar::{CalendarBackend, EventBody};

/// Per-descriptor creation result. `error` is the flattened backend error
/// text when `succeeded` is false.
#[derive(Debug, Clone)]
pub struct CreationOutcome {
    pub descriptor: EventDescriptor,
    pub succeeded: bool,
    pub error: Option<String>,
}

/// Ordered results of one confirmed batch. Outcome order equals input
/// order; the reporter relies on that for deterministic messages.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<CreationOutcome>,
}

impl BatchSummary {
    pub fn created(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.created()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Best-effort batch creation: one call per descriptor, strictly
/// sequential. A failed item is recorded and the rest still run.
pub async fn dispatch(backend: &dyn CalendarBackend, batch: Vec<EventDescriptor>) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for descriptor in batch {
        let body = EventBody::from_descriptor(&descriptor);

        let outcome = match backend.create_event(&body).await {
            Ok(created) => {
                info!(event_id = %created.id, title = %descriptor.title, "event created");
                CreationOutcome { descriptor, succeeded: true, error: None }
            }
            Err(e) => {
                warn!(title = %descriptor.title, error = %e, "event creation failed");
                CreationOutcome { descriptor, succeeded: false, error: Some(e.to_string()) }
            }
        };

        summary.outcomes.push(outcome);
    }

    summary
}
