//! Dispatch coordinator: binds a CREATED prescription to a pharmacy.

use std::sync::Arc;

use derive_new::new;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::pharmacies::{Pharmacy, PharmacyDirectory, PharmacyId, PharmacySearch, DEFAULT_SEARCH_SIZE};
use crate::prescriptions::{
    Command, Event, LifecycleManager, PrescriptionId, PrescriptionStatus, Role, Transition,
};

/// What the doctor has picked so far
#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSelection {
    pub candidates: Vec<Pharmacy>,
    pub pharmacy: Option<Pharmacy>,
    pub prescription_id: Option<PrescriptionId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReceipt {
    pub prescription_id: PrescriptionId,
    pub pharmacy_id: PharmacyId,
    pub status: PrescriptionStatus,
    pub message: String,
}

pub struct DispatchCoordinator {
    manager: Arc<LifecycleManager>,
    directory: Arc<dyn PharmacyDirectory>,
    search_size: usize,
    selection: Mutex<DispatchSelection>,
}

impl DispatchCoordinator {
    pub fn new(manager: Arc<LifecycleManager>, directory: Arc<dyn PharmacyDirectory>) -> Self {
        Self {
            manager,
            directory,
            search_size: DEFAULT_SEARCH_SIZE,
            selection: Mutex::new(DispatchSelection::default()),
        }
    }

    pub fn with_search_size(mut self, size: usize) -> Self {
        self.search_size = size.max(1);
        self
    }

    pub fn selection(&self) -> DispatchSelection {
        self.selection.lock().clone()
    }

    /// Replaces the candidates and pre-selects the first one.
    pub async fn search_pharmacies(&self, keyword: &str) -> Result<Vec<Pharmacy>, Error> {
        let search = PharmacySearch::new(keyword.trim().to_string(), self.search_size);

        let mut found = self
            .directory
            .search_pharmacies(&search)
            .await
            .inspect_err(|e| tracing::warn!("Pharmacy search failed: {}", e))?;
        found.truncate(self.search_size);

        tracing::info!(
            "Found {} pharmacies for keyword {:?}",
            found.len(),
            search.keyword
        );

        let mut selection = self.selection.lock();
        selection.pharmacy = found.first().cloned();
        selection.candidates = found.clone();

        Ok(found)
    }

    /// Picks another candidate from the last search.
    pub fn select_pharmacy(&self, id: PharmacyId) -> Result<Pharmacy, Error> {
        let mut selection = self.selection.lock();
        let pharmacy = selection
            .candidates
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| Error::missing("pharmacyId"))?;

        selection.pharmacy = Some(pharmacy.clone());
        Ok(pharmacy)
    }

    pub fn select_prescription(&self, id: Option<PrescriptionId>) {
        self.selection.lock().prescription_id = id;
    }

    pub async fn dispatch_selected(&self, role: Role) -> Result<DispatchReceipt, Error> {
        let (prescription_id, pharmacy) = {
            let selection = self.selection.lock();
            (selection.prescription_id, selection.pharmacy.clone())
        };

        self.dispatch_to(prescription_id, pharmacy, role).await
    }

    /// Doctor-only: CREATED -> RECEIVED at `pharmacy_id`. Never retried.
    pub async fn dispatch(
        &self,
        prescription_id: Option<PrescriptionId>,
        pharmacy_id: Option<PharmacyId>,
        role: Role,
    ) -> Result<DispatchReceipt, Error> {
        let pharmacy = pharmacy_id.map(|id| {
            self.selection
                .lock()
                .candidates
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .unwrap_or_else(|| Pharmacy::with_id(id))
        });

        self.dispatch_to(prescription_id, pharmacy, role).await
    }

    async fn dispatch_to(
        &self,
        prescription_id: Option<PrescriptionId>,
        pharmacy: Option<Pharmacy>,
        role: Role,
    ) -> Result<DispatchReceipt, Error> {
        Transition::Dispatch.authorize(role)?;
        let pharmacy = pharmacy.ok_or_else(|| Error::missing("pharmacyId"))?;
        let prescription_id = prescription_id.ok_or_else(|| Error::missing("prescriptionId"))?;
        let pharmacy_id = pharmacy.id;

        tracing::info!(
            "Dispatching prescription {} to pharmacy {}",
            prescription_id,
            pharmacy_id
        );

        let executed = self
            .manager
            .execute(prescription_id, Command::Dispatch { pharmacy, role })
            .await?;

        let message = executed
            .events
            .iter()
            .find_map(|event| match event {
                Event::PrescriptionDispatched { message, .. } => Some(message.clone()),
                _ => None,
            })
            .unwrap_or_default();

        {
            let mut selection = self.selection.lock();
            if selection.prescription_id == Some(prescription_id) {
                selection.prescription_id = None;
            }
        }

        self.refresh_detail(prescription_id).await;

        Ok(DispatchReceipt::new(
            prescription_id,
            pharmacy_id,
            executed.prescription.status,
            message,
        ))
    }

    /// Best effort; the dispatch already succeeded.
    async fn refresh_detail(&self, prescription_id: PrescriptionId) {
        let snapshot = self.manager.snapshot();
        let displayed = snapshot.selected_id == Some(prescription_id)
            || snapshot
                .detail
                .as_ref()
                .is_some_and(|d| d.prescription_id == prescription_id);

        if !displayed {
            return;
        }

        if let Err(e) = self.manager.get_detail(prescription_id).await {
            tracing::warn!(
                "Dispatched prescription {} but could not refresh its detail: {}",
                prescription_id,
                e
            );
        }
    }
}

/// Parses a prescription id typed in by the doctor.
pub fn parse_prescription_id(input: &str) -> Result<PrescriptionId, Error> {
    input
        .trim()
        .parse::<PrescriptionId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::missing("prescriptionId"))
}
