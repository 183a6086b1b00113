use idconsole_interfaces::ServiceError;
use thiserror::Error;

/// Core error type for the console engines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// Wizard operation attempted in an invalid state
    #[error("Wizard state error: {0}")]
    WizardStateError(String),

    /// Wizard step execution error
    #[error("Step execution error: {0}")]
    StepExecutionError(String),

    /// Reconciliation operation attempted in an invalid state
    #[error("Reconciliation state error: {0}")]
    ReconciliationStateError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Backend service error
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::SerializationError(err.to_string())
    }
}

impl From<String> for ConsoleError {
    fn from(err: String) -> Self {
        ConsoleError::Other(err)
    }
}

impl From<&str> for ConsoleError {
    fn from(err: &str) -> Self {
        ConsoleError::Other(err.to_string())
    }
}
