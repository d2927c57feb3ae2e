use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::prescriptions::{
    DoctorSnapshot, MedicalRecordId, PatientSnapshot, PrescribedMedicine, PrescriptionId,
    PrescriptionStatus,
};

/// Prescription as embedded in a medical record
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordPrescription {
    pub prescription_id: PrescriptionId,
    #[serde(default)]
    pub status: Option<PrescriptionStatus>,
    #[serde(default)]
    pub medicines: Vec<PrescribedMedicine>,
}

/// Medical record, read-only context for prescriptions
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    #[serde(alias = "id", alias = "medicalRecordId")]
    pub record_id: MedicalRecordId,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub visit_date: Option<NaiveDate>,
    #[serde(default)]
    pub patient: PatientSnapshot,
    #[serde(default)]
    pub doctor: DoctorSnapshot,
    #[serde(default)]
    pub prescription: Option<RecordPrescription>,
}

/// Body of `POST /medical-records`; the server issues the prescription
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicalRecord {
    pub patient_id: i64,
    pub diagnosis: String,
    #[serde(default)]
    pub medicines: Vec<PrescribedMedicine>,
}

impl NewMedicalRecord {
    pub fn validate(&self) -> Result<(), Error> {
        if self.patient_id <= 0 {
            return Err(Error::missing("patientId"));
        }
        if self.diagnosis.trim().is_empty() {
            return Err(Error::missing("diagnosis"));
        }
        if self.medicines.iter().any(|m| m.name.trim().is_empty()) {
            return Err(Error::missing("medicines[].name"));
        }
        Ok(())
    }
}

#[async_trait]
pub trait MedicalRecordService: Send + Sync {
    async fn list_records(&self) -> Result<Vec<MedicalRecord>, Error>;

    async fn create_record(&self, record: &NewMedicalRecord) -> Result<MedicalRecord, Error>;
}
