use chrono::{DateTime, Utc};
use cqrs_es::DomainEvent;
use serde::{Deserialize, Serialize};

use crate::pharmacies::Pharmacy;

use super::{PrescriptionId, PrescriptionStatus};

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    PrescriptionDispatched {
        prescription_id: PrescriptionId,
        pharmacy: Pharmacy,
        status: PrescriptionStatus,
        message: String,
        updated_at: DateTime<Utc>,
    },

    StatusAdvanced {
        prescription_id: PrescriptionId,
        from: PrescriptionStatus,
        to: PrescriptionStatus,
        updated_at: DateTime<Utc>,
    },
}

impl Event {
    pub fn prescription_id(&self) -> PrescriptionId {
        match self {
            Event::PrescriptionDispatched {
                prescription_id, ..
            }
            | Event::StatusAdvanced {
                prescription_id, ..
            } => *prescription_id,
        }
    }

    /// Status the prescription is in once this event is applied.
    pub fn status(&self) -> PrescriptionStatus {
        match self {
            Event::PrescriptionDispatched { status, .. } => *status,
            Event::StatusAdvanced { to, .. } => *to,
        }
    }
}

impl DomainEvent for Event {
    fn event_type(&self) -> String {
        match self {
            Event::PrescriptionDispatched { .. } => "Prescription:Dispatched".to_string(),
            Event::StatusAdvanced { .. } => "Prescription:StatusAdvanced".to_string(),
        }
    }

    fn event_version(&self) -> String {
        "1.0".to_string()
    }
}
