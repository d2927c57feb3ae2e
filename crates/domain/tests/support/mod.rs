#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use domain::{
    pharmacies::{Pharmacy, PharmacyDirectory, PharmacySearch},
    prescriptions::{
        DispatchResponse, LifecycleManager, PatientSnapshot, Prescription, PrescriptionApi,
        PrescriptionId, PrescriptionStatus, PrescriptionSummary, Services, StatusUpdate,
        WorkspaceStore,
    },
    Error,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// In-memory stand-in for the record/prescription service
#[derive(Default)]
pub struct FakeApi {
    prescriptions: Mutex<Vec<Prescription>>,
    pharmacies: Mutex<Vec<Pharmacy>>,
    calls: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
    confirm_override: Mutex<Option<PrescriptionStatus>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    pub fn with(prescriptions: Vec<Prescription>) -> Arc<Self> {
        let api = Self::default();
        *api.prescriptions.lock() = prescriptions;
        Arc::new(api)
    }

    pub fn set_pharmacies(&self, pharmacies: Vec<Pharmacy>) {
        *self.pharmacies.lock() = pharmacies;
    }

    pub fn remove(&self, id: PrescriptionId) {
        self.prescriptions.lock().retain(|p| p.prescription_id != id);
    }

    /// Every remote call fails with `message` until cleared.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock() = message.map(str::to_string);
    }

    /// Status updates confirm `status` instead of the requested one.
    pub fn confirm_as(&self, status: PrescriptionStatus) {
        *self.confirm_override.lock() = Some(status);
    }

    /// Status updates wait on the returned notifier before answering.
    pub fn hold_updates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn status_of(&self, id: PrescriptionId) -> Option<PrescriptionStatus> {
        self.find(id).map(|p| p.status)
    }

    pub fn find(&self, id: PrescriptionId) -> Option<Prescription> {
        self.prescriptions
            .lock()
            .iter()
            .find(|p| p.prescription_id == id)
            .cloned()
    }

    fn record(&self, call: String) -> Result<(), Error> {
        self.calls.lock().push(call);
        match self.failure.lock().clone() {
            Some(message) => Err(Error::remote(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PrescriptionApi for FakeApi {
    async fn list_prescriptions(&self) -> Result<Vec<PrescriptionSummary>, Error> {
        self.record("GET /prescriptions".to_string())?;
        Ok(self
            .prescriptions
            .lock()
            .iter()
            .map(PrescriptionSummary::from)
            .collect())
    }

    async fn get_prescription(&self, id: PrescriptionId) -> Result<Prescription, Error> {
        self.record(format!("GET /prescriptions/{}", id))?;
        self.find(id)
            .ok_or_else(|| Error::remote("Prescription not found"))
    }

    async fn update_status(
        &self,
        id: PrescriptionId,
        status: PrescriptionStatus,
    ) -> Result<StatusUpdate, Error> {
        self.record(format!("PATCH /prescriptions/{}/status {}", id, status))?;

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let confirmed = self.confirm_override.lock().unwrap_or(status);
        let mut prescriptions = self.prescriptions.lock();
        let prescription = prescriptions
            .iter_mut()
            .find(|p| p.prescription_id == id)
            .ok_or_else(|| Error::remote("Prescription not found"))?;
        prescription.status = confirmed;

        Ok(StatusUpdate {
            prescription_id: Some(id),
            status: confirmed,
        })
    }

    async fn dispatch(
        &self,
        id: PrescriptionId,
        pharmacy_id: i64,
    ) -> Result<DispatchResponse, Error> {
        self.record(format!("POST /prescriptions/{}/dispatch {}", id, pharmacy_id))?;

        let pharmacy = self
            .pharmacies
            .lock()
            .iter()
            .find(|p| p.id == pharmacy_id)
            .cloned()
            .unwrap_or_else(|| Pharmacy::with_id(pharmacy_id));

        let mut prescriptions = self.prescriptions.lock();
        let prescription = prescriptions
            .iter_mut()
            .find(|p| p.prescription_id == id)
            .ok_or_else(|| Error::remote("Prescription not found"))?;

        if prescription.status != PrescriptionStatus::Created {
            return Err(Error::remote("already dispatched"));
        }
        prescription.status = PrescriptionStatus::Received;
        prescription.pharmacy = Some(pharmacy);

        Ok(DispatchResponse {
            message: Some(format!("Prescription {} sent to pharmacy {}", id, pharmacy_id)),
        })
    }
}

#[async_trait]
impl PharmacyDirectory for FakeApi {
    async fn search_pharmacies(&self, search: &PharmacySearch) -> Result<Vec<Pharmacy>, Error> {
        self.record(format!("GET /pharmacies?keyword={}", search.keyword))?;
        let keyword = search.keyword.to_lowercase();
        Ok(self
            .pharmacies
            .lock()
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&keyword)
                    || p.address.to_lowercase().contains(&keyword)
            })
            .take(search.size)
            .cloned()
            .collect())
    }
}

pub fn prescription(id: PrescriptionId, status: PrescriptionStatus) -> Prescription {
    Prescription {
        prescription_id: id,
        medical_record_id: id + 100,
        diagnosis: "Acute sinusitis".to_string(),
        status,
        patient: PatientSnapshot {
            id: 5,
            name: "Lee Minho".to_string(),
        },
        pharmacy: status
            .requires_pharmacy()
            .then(|| pharmacy(7, "Central Pharmacy", "1 Main St")),
        ..Default::default()
    }
}

pub fn pharmacy(id: i64, name: &str, address: &str) -> Pharmacy {
    Pharmacy {
        id,
        name: name.to_string(),
        address: address.to_string(),
        ..Default::default()
    }
}

/// Counts pending-count signals and remembers the last value
#[derive(Clone, Default)]
pub struct PendingProbe {
    pub fired: Arc<AtomicUsize>,
    pub last: Arc<AtomicUsize>,
}

impl PendingProbe {
    pub fn fired(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> usize {
        self.last.load(Ordering::SeqCst)
    }
}

pub fn manager(api: Arc<FakeApi>) -> (LifecycleManager, PendingProbe) {
    let store = WorkspaceStore::new();
    let probe = PendingProbe::default();
    let signal = probe.clone();

    let manager = LifecycleManager::new(Services::new(api), store.clone()).with_query(
        domain::prescriptions::PendingCountQuery::new(store, move |count| {
            signal.fired.fetch_add(1, Ordering::SeqCst);
            signal.last.store(count, Ordering::SeqCst);
        }),
    );

    (manager, probe)
}
