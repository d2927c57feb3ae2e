/// Prescription aggregate
pub mod aggregate;

/// Remote prescription service contract
pub mod api;

/// Commands
pub mod commands;

/// Events
pub mod events;

/// Wire DTOs
pub mod inputs;

/// Lifecycle manager
pub mod manager;

/// Status-change observers
pub mod queries;

/// Status state machine and roles
pub mod status;

/// Session store (read model)
pub mod view;

pub use aggregate::{
    DoctorSnapshot, MedicalRecordId, PatientSnapshot, PrescribedMedicine, Prescription,
    PrescriptionId, Services, AGGREGATE_TYPE,
};
pub use api::PrescriptionApi;
pub use commands::Command;
pub use events::Event;
pub use inputs::{DispatchInput, DispatchResponse, StatusUpdate, StatusUpdateInput};
pub use manager::{Executed, LifecycleManager};
pub use queries::{NotificationQuery, PendingCountQuery};
pub use status::{ParseRoleError, PrescriptionStatus, Role, Transition};
pub use view::{
    PrescriptionSummary, Resource, Ticket, TransitionGuard, WorkspaceSnapshot, WorkspaceStore,
};
