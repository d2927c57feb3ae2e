use cqrs_es::{Aggregate, DomainEvent as _, EventEnvelope};
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::prescriptions::Prescription;

/// Serializable status-change notification handed to observers
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct DomainEvent {
    pub id: String,
    pub aggregate_type: String,
    pub sequence: usize,
    pub event_type: String,
    pub event_version: String,
    pub payload: String,
    pub metadata: String,
}

impl TryFrom<&EventEnvelope<Prescription>> for DomainEvent {
    type Error = serde_json::Error;

    fn try_from(envelope: &EventEnvelope<Prescription>) -> Result<Self, Self::Error> {
        Ok(DomainEvent::new(
            envelope.aggregate_id.clone(),
            Prescription::aggregate_type(),
            envelope.sequence,
            envelope.payload.event_type(),
            envelope.payload.event_version(),
            serde_json::to_string(&envelope.payload)?,
            serde_json::to_string(&envelope.metadata)?,
        ))
    }
}
