//! Prescription Workflow Domain Models

/// Prescription lifecycle aggregate and manager
pub mod prescriptions;

/// Dispatch coordinator
pub mod dispatch;

/// Pharmacy directory contract
pub mod pharmacies;

/// Medical record service contract
pub mod records;

/// Domain errors
pub mod errors;

/// Domain events wrapper
pub mod event;

pub use dispatch::{parse_prescription_id, DispatchCoordinator, DispatchReceipt, DispatchSelection};
pub use errors::Error;
pub use event::DomainEvent;
