use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::pharmacies::Pharmacy;

use super::{
    DoctorSnapshot, MedicalRecordId, PatientSnapshot, Prescription, PrescriptionId,
    PrescriptionStatus,
};

/// List item returned by `GET /prescriptions`
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionSummary {
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
}

impl From<&Prescription> for PrescriptionSummary {
    fn from(p: &Prescription) -> Self {
        Self {
            prescription_id: p.prescription_id,
            medical_record_id: p.medical_record_id,
            issue_date: p.issue_date,
            diagnosis: p.diagnosis.clone(),
            status: p.status,
            patient: p.patient.clone(),
            doctor: p.doctor.clone(),
            pharmacy: p.pharmacy.clone(),
        }
    }
}

impl From<&PrescriptionSummary> for Prescription {
    fn from(s: &PrescriptionSummary) -> Self {
        Self {
            prescription_id: s.prescription_id,
            medical_record_id: s.medical_record_id,
            issue_date: s.issue_date,
            diagnosis: s.diagnosis.clone(),
            status: s.status,
            patient: s.patient.clone(),
            doctor: s.doctor.clone(),
            pharmacy: s.pharmacy.clone(),
            medicines: Vec::new(),
        }
    }
}

/// Read-only copy of the workspace state
#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub prescriptions: Vec<PrescriptionSummary>,
    pub selected_id: Option<PrescriptionId>,
    pub detail: Option<Prescription>,
}

impl WorkspaceSnapshot {
    /// The held detail, but only when it belongs to the current selection.
    pub fn selected_detail(&self) -> Option<&Prescription> {
        let selected = self.selected_id?;
        self.detail
            .as_ref()
            .filter(|d| d.prescription_id == selected)
    }

    pub fn find(&self, id: PrescriptionId) -> Option<&PrescriptionSummary> {
        self.prescriptions.iter().find(|p| p.prescription_id == id)
    }

    /// Prescriptions waiting on the pharmacy (RECEIVED).
    pub fn pending_count(&self) -> usize {
        self.prescriptions
            .iter()
            .filter(|p| p.status == PrescriptionStatus::Received)
            .count()
    }
}

/// Resources the workspace fetches
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Resource {
    List,
    Detail(PrescriptionId),
}

/// Handle for one in-flight read
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ticket {
    resource: Resource,
    sequence: u64,
}

impl Ticket {
    pub fn resource(&self) -> Resource {
        self.resource
    }
}

#[derive(Debug, Default)]
struct RequestTracker {
    next: u64,
    applied: HashMap<Resource, u64>,
}

impl RequestTracker {
    fn issue(&mut self, resource: Resource) -> Ticket {
        self.next += 1;
        Ticket {
            resource,
            sequence: self.next,
        }
    }

    /// False when a newer read of the same resource already landed.
    fn complete(&mut self, ticket: Ticket) -> bool {
        match self.applied.get(&ticket.resource) {
            Some(&latest) if latest > ticket.sequence => false,
            _ => {
                self.applied.insert(ticket.resource, ticket.sequence);
                true
            }
        }
    }

    /// Invalidates every read of `resource` issued so far.
    fn supersede(&mut self, resource: Resource) {
        let ticket = self.issue(resource);
        self.complete(ticket);
    }
}

#[derive(Debug, Default)]
struct WorkspaceState {
    snapshot: WorkspaceSnapshot,
    requests: RequestTracker,
    in_flight: HashSet<PrescriptionId>,
    /// Ticket of the detail currently held, whatever its id
    detail_sequence: u64,
}

/// Session-scoped store behind the lifecycle manager.
///
/// Cloning is cheap and every clone shares the same state. The lock is
/// never held across an await; readers only ever see owned snapshots.
#[derive(Clone, Debug, Default)]
pub struct WorkspaceStore {
    state: Arc<Mutex<WorkspaceState>>,
}

impl WorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        self.state.lock().snapshot.clone()
    }

    pub fn begin(&self, resource: Resource) -> Ticket {
        self.state.lock().requests.issue(resource)
    }

    /// Replaces the list wholesale and reconciles the selection.
    /// Returns false if the completion was stale and got discarded.
    pub fn replace_list(&self, ticket: Ticket, prescriptions: Vec<PrescriptionSummary>) -> bool {
        let mut state = self.state.lock();
        if !state.requests.complete(ticket) {
            return false;
        }

        let selected = reconcile_selection(state.snapshot.selected_id, &prescriptions);
        state.snapshot.prescriptions = prescriptions;
        state.snapshot.selected_id = selected;
        true
    }

    /// Replaces the held detail wholesale.
    /// Returns false if the completion was stale and got discarded.
    ///
    /// There is a single detail slot, so a detail requested before the one
    /// already held is stale even when it is for another prescription.
    pub fn replace_detail(&self, ticket: Ticket, detail: Prescription) -> bool {
        let mut state = self.state.lock();
        if ticket.sequence < state.detail_sequence || !state.requests.complete(ticket) {
            return false;
        }

        state.detail_sequence = ticket.sequence;
        state.snapshot.detail = Some(detail);
        true
    }

    pub fn select(&self, id: Option<PrescriptionId>) {
        self.state.lock().snapshot.selected_id = id;
    }

    /// Best local knowledge of a prescription: the held detail, then the list.
    pub fn load(&self, id: PrescriptionId) -> Option<Prescription> {
        let state = self.state.lock();
        let snapshot = &state.snapshot;

        snapshot
            .detail
            .as_ref()
            .filter(|d| d.prescription_id == id)
            .cloned()
            .or_else(|| snapshot.find(id).map(Prescription::from))
    }

    /// Records a server-confirmed transition in the list and held detail.
    ///
    /// Reads of the prescription that were issued before the transition
    /// completed are discarded from now on.
    pub fn apply_transition(&self, prescription: &Prescription) {
        let mut state = self.state.lock();
        let id = prescription.prescription_id;

        if let Some(entry) = state
            .snapshot
            .prescriptions
            .iter_mut()
            .find(|p| p.prescription_id == id)
        {
            entry.status = prescription.status;
            entry.pharmacy = prescription.pharmacy.clone();
        }

        if let Some(detail) = state
            .snapshot
            .detail
            .as_mut()
            .filter(|d| d.prescription_id == id)
        {
            detail.status = prescription.status;
            detail.pharmacy = prescription.pharmacy.clone();
        }

        state.requests.supersede(Resource::Detail(id));
        state.requests.supersede(Resource::List);
    }

    /// Claims the right to change `id`'s status until the guard drops.
    pub fn try_claim(&self, id: PrescriptionId) -> Result<TransitionGuard, Error> {
        if !self.state.lock().in_flight.insert(id) {
            return Err(Error::Busy {
                prescription_id: id,
            });
        }

        Ok(TransitionGuard {
            store: self.clone(),
            prescription_id: id,
        })
    }
}

/// Releases the per-prescription busy flag on drop
#[derive(Debug)]
pub struct TransitionGuard {
    store: WorkspaceStore,
    prescription_id: PrescriptionId,
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        self.store
            .state
            .lock()
            .in_flight
            .remove(&self.prescription_id);
    }
}

/// Keeps the selection if it survived the refresh, else falls back to the first entry.
fn reconcile_selection(
    selected: Option<PrescriptionId>,
    prescriptions: &[PrescriptionSummary],
) -> Option<PrescriptionId> {
    match selected {
        Some(id) if prescriptions.iter().any(|p| p.prescription_id == id) => Some(id),
        _ => prescriptions.first().map(|p| p.prescription_id),
    }
}
