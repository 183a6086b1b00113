//!
//! Identity Console Core - wizard execution and attribute reconciliation
//!
//! This crate implements the two stateful engines behind the identity
//! console's administration screens: the wizard engine driving multi-step
//! system/account creation flows against the connector-type execution
//! endpoint, and the attribute reconciliation engine merging live
//! connector-object snapshots with manually stored override values.
//!
//! Backend access goes exclusively through the service traits of
//! `idconsole-interfaces`; this crate carries no networking or persistence
//! of its own.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - aggregates, value objects, and domain events
pub mod domain;

/// Application services - engine orchestration over injected clients
pub mod application;

/// Error types
pub mod error;

// Re-export key types
pub use error::ConsoleError;

pub use domain::attributes::{
    join_values, split_values, typed_form_value, AttributeDelta, AttributeRow,
};
pub use domain::events::DomainEvent;
pub use domain::reconciliation::AttributeReconciliation;
pub use domain::wizard::{
    prune_steps, StepExecutor, StepId, StepSource, StepValidator, ValidationMessage,
    WizardContext, WizardRunId, WizardStatus, WizardStep,
};

pub use application::reconciliation_service::{
    AttributeReconciliationService, ReconciliationWarning,
};
pub use application::wizard_engine::{
    AdvanceOutcome, BeginAdvance, ConnectorTypeStepExecutor, PendingExecution, WizardEngine,
};

// The backend contracts, re-exported for downstream convenience
pub use idconsole_interfaces as interfaces;
