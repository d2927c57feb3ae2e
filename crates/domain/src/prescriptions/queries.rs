use async_trait::async_trait;
use cqrs_es::{EventEnvelope, Query};

use crate::event::DomainEvent;

use super::{Prescription, WorkspaceStore};

/// Recomputes the RECEIVED count whenever a status changes
pub struct PendingCountQuery {
    store: WorkspaceStore,
    on_change: Box<dyn Fn(usize) + Send + Sync>,
}

impl PendingCountQuery {
    pub fn new(store: WorkspaceStore, on_change: impl Fn(usize) + Send + Sync + 'static) -> Self {
        Self {
            store,
            on_change: Box::new(on_change),
        }
    }
}

#[async_trait]
impl Query<Prescription> for PendingCountQuery {
    async fn dispatch(&self, _prescription_id: &str, events: &[EventEnvelope<Prescription>]) {
        if events.is_empty() {
            return;
        }
        (self.on_change)(self.store.snapshot().pending_count());
    }
}

/// Forwards status changes to an external observer
pub struct NotificationQuery {
    sink: Box<dyn Fn(DomainEvent) + Send + Sync>,
}

impl NotificationQuery {
    pub fn new(sink: impl Fn(DomainEvent) + Send + Sync + 'static) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }
}

#[async_trait]
impl Query<Prescription> for NotificationQuery {
    async fn dispatch(&self, prescription_id: &str, events: &[EventEnvelope<Prescription>]) {
        for envelope in events {
            match DomainEvent::try_from(envelope) {
                Ok(event) => (self.sink)(event),
                Err(e) => tracing::error!(
                    "NotificationQuery error for {}: {}",
                    prescription_id,
                    e
                ),
            }
        }
    }
}
