//! Service contracts consumed by the console engines
//!
//! Each trait stands for one backend REST surface. Implementations are
//! injected as `Arc<dyn …>` service clients; the engines never construct
//! them.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::types::{
    AccountEntity, ConnectorObject, ConnectorTypeDescriptor, EntityId, FormDefinition,
    FormDefinitionId, FormValue, MappingId, MappingStrategy,
};

/// Result type for backend service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by backend service calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The requested resource was not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The backend rejected the request as invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The backend rejected a persistence attempt
    #[error("Persistence rejected: {0}")]
    PersistenceRejected(String),

    /// Error communicating with the backend
    #[error("Communication error: {0}")]
    CommunicationError(String),

    /// Error during serialization or deserialization
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal backend error
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

/// Connector-type wizard execution endpoint
///
/// Accepts a descriptor carrying the wizard's accumulated state and returns
/// an updated descriptor of the same shape. Idempotent per
/// `wizard_step_name`: re-issuing the same call with the same step name and
/// inputs is safe to retry.
#[async_trait]
pub trait ConnectorTypeExecution: Send + Sync {
    /// Execute one wizard step on the backend.
    async fn execute(
        &self,
        descriptor: ConnectorTypeDescriptor,
    ) -> ServiceResult<ConnectorTypeDescriptor>;
}

/// Live connector object reads
#[async_trait]
pub trait ConnectorObjectReader: Send + Sync {
    /// Read the live connector object for an entity. Returns `Ok(None)`
    /// when the target system cannot produce the entity.
    async fn read(&self, entity_id: &EntityId) -> ServiceResult<Option<ConnectorObject>>;
}

/// Extensible-attribute (EAV) form value reads and writes
#[async_trait]
pub trait FormValueService: Send + Sync {
    /// Fetch the schema of a form definition, including attribute codes and
    /// declared persistent types.
    async fn definition(
        &self,
        form_definition: &FormDefinitionId,
    ) -> ServiceResult<FormDefinition>;

    /// Load the stored values of one form definition for an owning entity.
    async fn load(
        &self,
        owner: &EntityId,
        form_definition: &FormDefinitionId,
    ) -> ServiceResult<Vec<FormValue>>;

    /// Persist a batch of typed values for an owning entity. Applied
    /// atomically: a partial failure rejects the whole batch.
    async fn save(
        &self,
        owner: &EntityId,
        form_definition: &FormDefinitionId,
        values: Vec<FormValue>,
    ) -> ServiceResult<()>;
}

/// Attribute mapping strategy lookups
#[async_trait]
pub trait AttributeMappingService: Send + Sync {
    /// Strategy per attribute name configured on a system mapping.
    async fn strategies(
        &self,
        mapping_id: &MappingId,
    ) -> ServiceResult<HashMap<String, MappingStrategy>>;

    /// Values the mapping/strategy engine would compute for one attribute of
    /// an entity, absent any manual override. `None` when the engine
    /// produces nothing for the attribute.
    async fn authoritative_value(
        &self,
        entity_id: &EntityId,
        attribute_name: &str,
    ) -> ServiceResult<Option<Vec<String>>>;
}

/// Account entity lookups
#[async_trait]
pub trait AccountReader: Send + Sync {
    /// Find the owning account entity by id.
    async fn find_by_id(&self, entity_id: &EntityId) -> ServiceResult<Option<AccountEntity>>;
}
