use std::collections::HashMap;

use cqrs_es::{Aggregate, EventEnvelope, Query};
use ulid::Ulid;

use crate::errors::Error;

use super::{
    Command, Event, Prescription, PrescriptionId, PrescriptionStatus, PrescriptionSummary,
    Resource, Role, Services, WorkspaceSnapshot, WorkspaceStore,
};

/// Outcome of a successfully executed command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Executed {
    pub prescription: Prescription,
    pub events: Vec<Event>,
}

/// Prescription lifecycle manager.
///
/// Owns the workspace store, runs commands against the prescription
/// aggregate and fans the resulting events out to the registered queries.
pub struct LifecycleManager {
    services: Services,
    store: WorkspaceStore,
    queries: Vec<Box<dyn Query<Prescription>>>,
}

impl LifecycleManager {
    pub fn new(services: Services, store: WorkspaceStore) -> Self {
        Self {
            services,
            store,
            queries: Vec::new(),
        }
    }

    pub fn with_query(mut self, query: impl Query<Prescription> + 'static) -> Self {
        self.queries.push(Box::new(query));
        self
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        self.store.snapshot()
    }

    pub fn select(&self, id: Option<PrescriptionId>) {
        self.store.select(id);
    }

    /// Full refresh of the visible prescriptions; reconciles the selection.
    pub async fn list_prescriptions(&self) -> Result<Vec<PrescriptionSummary>, Error> {
        let ticket = self.store.begin(Resource::List);

        let prescriptions = self
            .services
            .prescriptions
            .list_prescriptions()
            .await
            .inspect_err(|e| tracing::warn!("Failed to list prescriptions: {}", e))?;

        tracing::info!("Loaded {} prescriptions", prescriptions.len());

        if !self.store.replace_list(ticket, prescriptions) {
            tracing::debug!("Discarding stale prescription list");
        }

        Ok(self.store.snapshot().prescriptions)
    }

    /// Loads the full detail. A failure leaves the held detail untouched.
    pub async fn get_detail(&self, id: PrescriptionId) -> Result<Prescription, Error> {
        let ticket = self.store.begin(Resource::Detail(id));

        let detail = self
            .services
            .prescriptions
            .get_prescription(id)
            .await
            .inspect_err(|e| tracing::warn!("Failed to load prescription {}: {}", id, e))?;

        detail.validate()?;

        if self.store.replace_detail(ticket, detail.clone()) {
            return Ok(detail);
        }

        tracing::debug!("Discarding stale detail for prescription {}", id);
        Ok(self
            .store
            .snapshot()
            .detail
            .filter(|held| held.prescription_id == id)
            .unwrap_or(detail))
    }

    /// List refresh followed by the detail of whatever ends up selected.
    pub async fn refresh(&self) -> Result<WorkspaceSnapshot, Error> {
        self.list_prescriptions().await?;

        if let Some(id) = self.store.snapshot().selected_id {
            self.get_detail(id).await?;
        }

        Ok(self.store.snapshot())
    }

    /// Pharmacist-only: RECEIVED -> DISPENSING -> COMPLETED.
    pub async fn advance(
        &self,
        id: PrescriptionId,
        role: Role,
    ) -> Result<PrescriptionStatus, Error> {
        let executed = self.execute(id, Command::Advance { role }).await?;
        Ok(executed.prescription.status)
    }

    pub async fn execute(&self, id: PrescriptionId, command: Command) -> Result<Executed, Error> {
        let mut metadata = HashMap::new();
        metadata.insert("command_id".to_string(), Ulid::new().to_string());

        self.execute_with_metadata(id, command, metadata).await
    }

    /// Load, handle, apply and notify, in the order `CqrsFramework` uses.
    ///
    /// The framework needs an event store to rebuild the aggregate; here the
    /// state comes from the remote read model held in the workspace store, so
    /// the steps run inline. Envelope sequences are the status position.
    pub async fn execute_with_metadata(
        &self,
        id: PrescriptionId,
        command: Command,
        metadata: HashMap<String, String>,
    ) -> Result<Executed, Error> {
        command.authorize()?;
        if id <= 0 {
            return Err(Error::missing("prescriptionId"));
        }
        let _guard = self.store.try_claim(id)?;

        let aggregate = match (self.store.load(id), &command) {
            (Some(known), _) => known,
            (None, Command::Dispatch { .. }) => Prescription::placeholder(id),
            (None, Command::Advance { .. }) => self.get_detail(id).await?,
        };

        let transition = command.transition();
        tracing::info!(
            "Executing {} on prescription {} ({})",
            transition,
            id,
            aggregate.status
        );

        let events = aggregate
            .handle(command, &self.services)
            .await
            .inspect_err(|e| {
                tracing::warn!("Failed to {} prescription {}: {}", transition, id, e)
            })?;

        let mut prescription = aggregate;
        for event in events.iter().cloned() {
            prescription.apply(event);
        }

        self.store.apply_transition(&prescription);
        tracing::info!("Prescription {} is now {}", id, prescription.status);

        self.dispatch_to_queries(id, &events, metadata).await;

        Ok(Executed {
            prescription,
            events,
        })
    }

    async fn dispatch_to_queries(
        &self,
        id: PrescriptionId,
        events: &[Event],
        metadata: HashMap<String, String>,
    ) {
        let aggregate_id = id.to_string();
        let envelopes: Vec<EventEnvelope<Prescription>> = events
            .iter()
            .map(|event| EventEnvelope {
                aggregate_id: aggregate_id.clone(),
                sequence: event.status().position(),
                payload: event.clone(),
                metadata: metadata.clone(),
            })
            .collect();

        for query in &self.queries {
            query.dispatch(&aggregate_id, &envelopes).await;
        }
    }
}
