use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::Error;

/// Prescription workflow status
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrescriptionStatus {
    /// Issued while authoring a medical record, not routed yet
    #[default]
    Created,
    /// Routed to a pharmacy
    Received,
    /// Pharmacy is preparing the medicines
    Dispensing,
    /// Handed over to the patient
    Completed,
}

/// The two ways a prescription moves forward
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// CREATED -> RECEIVED, binds the pharmacy
    Dispatch,
    /// RECEIVED -> DISPENSING -> COMPLETED
    Advance,
}

/// Actor capability tag
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Doctor,
    Pharmacist,
}

impl PrescriptionStatus {
    pub const SEQUENCE: [PrescriptionStatus; 4] = [
        PrescriptionStatus::Created,
        PrescriptionStatus::Received,
        PrescriptionStatus::Dispensing,
        PrescriptionStatus::Completed,
    ];

    /// Immediate successor in the lifecycle, regardless of who moves it there.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Received),
            Self::Received => Some(Self::Dispensing),
            Self::Dispensing => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Status reached by applying `transition`, if it is legal from here.
    pub fn successor(self, transition: Transition) -> Option<Self> {
        match (self, transition) {
            (Self::Created, Transition::Dispatch) => Some(Self::Received),
            (Self::Received, Transition::Advance) => Some(Self::Dispensing),
            (Self::Dispensing, Transition::Advance) => Some(Self::Completed),
            (Self::Created, Transition::Advance)
            | (Self::Completed, Transition::Advance)
            | (Self::Received | Self::Dispensing | Self::Completed, Transition::Dispatch) => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Every status after CREATED carries exactly one pharmacy.
    pub fn requires_pharmacy(self) -> bool {
        !matches!(self, Self::Created)
    }

    /// Zero-based position in the lifecycle.
    pub fn position(self) -> usize {
        match self {
            Self::Created => 0,
            Self::Received => 1,
            Self::Dispensing => 2,
            Self::Completed => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Received => "RECEIVED",
            Self::Dispensing => "DISPENSING",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Transition {
    pub fn required_role(self) -> Role {
        match self {
            Self::Dispatch => Role::Doctor,
            Self::Advance => Role::Pharmacist,
        }
    }

    pub fn authorize(self, role: Role) -> Result<(), Error> {
        if role != self.required_role() {
            return Err(Error::Unauthorized {
                role,
                transition: self,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch => f.write_str("dispatch"),
            Self::Advance => f.write_str("advance"),
        }
    }
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "DOCTOR",
            Self::Pharmacist => "PHARMACIST",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("Unknown role: {0} (expected doctor or pharmacist)")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DOCTOR" => Ok(Self::Doctor),
            "PHARMACIST" => Ok(Self::Pharmacist),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}
