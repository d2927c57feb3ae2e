use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use cqrs_es::Aggregate;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::pharmacies::Pharmacy;

use super::{Command, Event, PrescriptionApi, PrescriptionStatus, Transition};

pub type PrescriptionId = i64;
pub type MedicalRecordId = i64;

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientSnapshot {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSnapshot {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Hospital or clinic the doctor practises at
    #[serde(default, alias = "hospitalName")]
    pub affiliation: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrescribedMedicine {
    pub name: String,
    /// Catalog id, absent for free-text medicines
    #[serde(default)]
    pub medicine_id: Option<i64>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
}

/// Prescription aggregate
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub prescription_id: PrescriptionId,
    pub medical_record_id: MedicalRecordId,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub diagnosis: String,
    pub status: PrescriptionStatus,
    #[serde(default)]
    pub patient: PatientSnapshot,
    #[serde(default)]
    pub doctor: DoctorSnapshot,
    #[serde(default)]
    pub pharmacy: Option<Pharmacy>,
    #[serde(default)]
    pub medicines: Vec<PrescribedMedicine>,
}

pub const AGGREGATE_TYPE: &str = "Prescription";

#[derive(Clone, new)]
pub struct Services {
    pub prescriptions: Arc<dyn PrescriptionApi>,
}

#[async_trait]
impl Aggregate for Prescription {
    type Command = Command;
    type Event = Event;
    type Error = Error;
    type Services = Services;

    fn aggregate_type() -> String {
        AGGREGATE_TYPE.to_string()
    }

    async fn handle(
        &self,
        command: Self::Command,
        services: &Self::Services,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        command.authorize()?;

        match command {
            Command::Dispatch { pharmacy, .. } => {
                self.validate_existing()?;

                // Whether the prescription is still CREATED is the server's call.
                let response = services
                    .prescriptions
                    .dispatch(self.prescription_id, pharmacy.id)
                    .await?;

                Ok(vec![Event::PrescriptionDispatched {
                    prescription_id: self.prescription_id,
                    pharmacy,
                    status: PrescriptionStatus::Received,
                    message: response.message_or_default(),
                    updated_at: Utc::now(),
                }])
            }

            Command::Advance { .. } => {
                self.validate_existing()?;
                let next = self
                    .status
                    .successor(Transition::Advance)
                    .ok_or(Error::NoSuccessorState {
                        status: self.status,
                    })?;

                let confirmed = services
                    .prescriptions
                    .update_status(self.prescription_id, next)
                    .await?;

                if confirmed.status != next {
                    return Err(Error::InvalidStateTransition {
                        from: self.status,
                        to: confirmed.status,
                    });
                }

                Ok(vec![Event::StatusAdvanced {
                    prescription_id: self.prescription_id,
                    from: self.status,
                    to: confirmed.status,
                    updated_at: Utc::now(),
                }])
            }
        }
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            Event::PrescriptionDispatched {
                pharmacy, status, ..
            } => {
                self.pharmacy = Some(pharmacy);
                self.status = status;
            }

            Event::StatusAdvanced { to, .. } => {
                self.status = to;
            }
        }
    }
}

impl Prescription {
    /// A prescription known only by its id, e.g. typed in by a doctor.
    pub fn placeholder(prescription_id: PrescriptionId) -> Self {
        Self {
            prescription_id,
            ..Default::default()
        }
    }

    /// CREATED carries no pharmacy; every later status carries exactly one.
    pub fn validate(&self) -> Result<(), Error> {
        match (self.status.requires_pharmacy(), &self.pharmacy) {
            (false, Some(pharmacy)) => Err(Error::remote(format!(
                "Prescription {} is {} but already assigned to pharmacy {}",
                self.prescription_id, self.status, pharmacy.id
            ))),
            (true, None) => Err(Error::remote(format!(
                "Prescription {} is {} without an assigned pharmacy",
                self.prescription_id, self.status
            ))),
            _ => Ok(()),
        }
    }

    fn validate_existing(&self) -> Result<(), Error> {
        if self.prescription_id <= 0 {
            return Err(Error::missing("prescriptionId"));
        }
        Ok(())
    }
}
