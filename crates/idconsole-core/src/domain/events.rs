use crate::domain::wizard::{StepId, WizardRunId};
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Domain event trait for wizard run events
pub trait DomainEvent: Debug + Send + Sync {
    /// Returns the type of the event as a string
    fn event_type(&self) -> &'static str;

    /// Returns the wizard run this event is associated with
    fn wizard_run_id(&self) -> &WizardRunId;

    /// Returns the timestamp when the event occurred
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Event: wizard run started
#[derive(Debug)]
pub struct WizardStarted {
    /// The wizard run identifier
    pub wizard_run_id: WizardRunId,

    /// When the run started
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for WizardStarted {
    fn event_type(&self) -> &'static str {
        "wizard.started"
    }

    fn wizard_run_id(&self) -> &WizardRunId {
        &self.wizard_run_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a step's backend execution completed and the wizard advanced
#[derive(Debug)]
pub struct WizardStepCompleted {
    /// The wizard run identifier
    pub wizard_run_id: WizardRunId,

    /// The step that completed
    pub step_id: StepId,

    /// When the step completed
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for WizardStepCompleted {
    fn event_type(&self) -> &'static str {
        "wizard.step_completed"
    }

    fn wizard_run_id(&self) -> &WizardRunId {
        &self.wizard_run_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a step's backend execution failed; the wizard stayed on the step
#[derive(Debug)]
pub struct WizardStepFailed {
    /// The wizard run identifier
    pub wizard_run_id: WizardRunId,

    /// The step that failed
    pub step_id: StepId,

    /// The error message
    pub error: String,

    /// When the step failed
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for WizardStepFailed {
    fn event_type(&self) -> &'static str {
        "wizard.step_failed"
    }

    fn wizard_run_id(&self) -> &WizardRunId {
        &self.wizard_run_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: wizard finished from its terminal step
#[derive(Debug)]
pub struct WizardFinished {
    /// The wizard run identifier
    pub wizard_run_id: WizardRunId,

    /// When the run finished
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for WizardFinished {
    fn event_type(&self) -> &'static str {
        "wizard.finished"
    }

    fn wizard_run_id(&self) -> &WizardRunId {
        &self.wizard_run_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: wizard cancelled by the user
#[derive(Debug)]
pub struct WizardCancelled {
    /// The wizard run identifier
    pub wizard_run_id: WizardRunId,

    /// When the run was cancelled
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for WizardCancelled {
    fn event_type(&self) -> &'static str {
        "wizard.cancelled"
    }

    fn wizard_run_id(&self) -> &WizardRunId {
        &self.wizard_run_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
