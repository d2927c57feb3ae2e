use thiserror::Error;

use crate::prescriptions::{PrescriptionId, PrescriptionStatus, Role, Transition};

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("Role {role} is not allowed to {transition} prescriptions")]
    Unauthorized { role: Role, transition: Transition },

    #[error("Prescription in status {status} has no next status")]
    NoSuccessorState { status: PrescriptionStatus },

    #[error("{message}")]
    RemoteFailure { message: String },

    #[error("Missing required selection: {field}")]
    ValidationGap { field: String },

    #[error("Prescription {prescription_id} already has a status change in flight")]
    Busy { prescription_id: PrescriptionId },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: PrescriptionStatus,
        to: PrescriptionStatus,
    },
}

impl Error {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteFailure {
            message: message.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::ValidationGap {
            field: field.to_string(),
        }
    }

    /// Failures reported by, or caused by, the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteFailure { .. } | Self::InvalidStateTransition { .. }
        )
    }
}
