use async_trait::async_trait;

use crate::errors::Error;
use crate::pharmacies::PharmacyId;

use super::{
    DispatchResponse, Prescription, PrescriptionId, PrescriptionStatus, PrescriptionSummary,
    StatusUpdate,
};

/// Remote record/prescription service. Scoping by role happens server-side.
#[async_trait]
pub trait PrescriptionApi: Send + Sync {
    async fn list_prescriptions(&self) -> Result<Vec<PrescriptionSummary>, Error>;

    async fn get_prescription(&self, id: PrescriptionId) -> Result<Prescription, Error>;

    async fn update_status(
        &self,
        id: PrescriptionId,
        status: PrescriptionStatus,
    ) -> Result<StatusUpdate, Error>;

    async fn dispatch(
        &self,
        id: PrescriptionId,
        pharmacy_id: PharmacyId,
    ) -> Result<DispatchResponse, Error>;
}
