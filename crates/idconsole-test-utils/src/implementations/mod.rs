//! In-memory fake implementations of the backend services
//!
//! Real state behind the service seams, for tests that want to observe
//! persisted batches or serve evolving snapshots without mock choreography.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use idconsole_interfaces::{
    AccountEntity, AccountReader, AttributeMappingService, ConnectorObject,
    ConnectorObjectReader, EntityId, FormDefinition, FormDefinitionId, FormValue,
    FormValueService, MappingId, MappingStrategy, ServiceError, ServiceResult,
};

/// In-memory form value store keyed by owning entity
///
/// `save` applies the batch the way the backend does: a null payload
/// removes all stored values of its attribute, anything else replaces them.
pub struct InMemoryFormValueService {
    definition: FormDefinition,
    values: RwLock<HashMap<EntityId, Vec<FormValue>>>,
    saved_batches: RwLock<Vec<Vec<FormValue>>>,
    fail_next_save: RwLock<Option<ServiceError>>,
}

impl InMemoryFormValueService {
    /// Store serving the given form definition.
    pub fn new(definition: FormDefinition) -> Self {
        Self {
            definition,
            values: RwLock::new(HashMap::new()),
            saved_batches: RwLock::new(Vec::new()),
            fail_next_save: RwLock::new(None),
        }
    }

    /// Seed stored values for an entity.
    pub fn seed(&self, owner: EntityId, values: Vec<FormValue>) {
        self.values.write().insert(owner, values);
    }

    /// Make the next save fail with the given error.
    pub fn fail_next_save(&self, error: ServiceError) {
        *self.fail_next_save.write() = Some(error);
    }

    /// Batches passed to `save`, in order.
    pub fn saved_batches(&self) -> Vec<Vec<FormValue>> {
        self.saved_batches.read().clone()
    }

    /// Currently stored values for an entity.
    pub fn stored(&self, owner: &EntityId) -> Vec<FormValue> {
        self.values.read().get(owner).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl FormValueService for InMemoryFormValueService {
    async fn definition(
        &self,
        _form_definition: &FormDefinitionId,
    ) -> ServiceResult<FormDefinition> {
        Ok(self.definition.clone())
    }

    async fn load(
        &self,
        owner: &EntityId,
        _form_definition: &FormDefinitionId,
    ) -> ServiceResult<Vec<FormValue>> {
        Ok(self.stored(owner))
    }

    async fn save(
        &self,
        owner: &EntityId,
        _form_definition: &FormDefinitionId,
        batch: Vec<FormValue>,
    ) -> ServiceResult<()> {
        self.saved_batches.write().push(batch.clone());

        if let Some(error) = self.fail_next_save.write().take() {
            return Err(error);
        }

        let mut values = self.values.write();
        let stored = values.entry(owner.clone()).or_default();
        for incoming in batch {
            stored.retain(|existing| existing.code != incoming.code);
            if incoming.value.is_some() {
                stored.push(incoming);
            }
        }
        Ok(())
    }
}

/// Connector object reader serving a fixed snapshot per entity
pub struct StaticConnectorObjectReader {
    objects: RwLock<HashMap<EntityId, ConnectorObject>>,
}

impl StaticConnectorObjectReader {
    /// Empty reader; unknown entities read as unreachable.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Serve a snapshot for an entity.
    pub fn insert(&self, entity: EntityId, object: ConnectorObject) {
        self.objects.write().insert(entity, object);
    }
}

impl Default for StaticConnectorObjectReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectorObjectReader for StaticConnectorObjectReader {
    async fn read(&self, entity_id: &EntityId) -> ServiceResult<Option<ConnectorObject>> {
        Ok(self.objects.read().get(entity_id).cloned())
    }
}

/// Mapping service serving fixed strategies and authoritative values
pub struct StaticMappingService {
    strategies: HashMap<String, MappingStrategy>,
    authoritative: RwLock<HashMap<String, Vec<String>>>,
}

impl StaticMappingService {
    /// Service with the given strategy per attribute name.
    pub fn new(strategies: HashMap<String, MappingStrategy>) -> Self {
        Self {
            strategies,
            authoritative: RwLock::new(HashMap::new()),
        }
    }

    /// Serve an authoritative value sequence for an attribute name.
    pub fn set_authoritative(&self, attribute: impl Into<String>, values: Vec<String>) {
        self.authoritative.write().insert(attribute.into(), values);
    }
}

#[async_trait]
impl AttributeMappingService for StaticMappingService {
    async fn strategies(
        &self,
        _mapping_id: &MappingId,
    ) -> ServiceResult<HashMap<String, MappingStrategy>> {
        Ok(self.strategies.clone())
    }

    async fn authoritative_value(
        &self,
        _entity_id: &EntityId,
        attribute_name: &str,
    ) -> ServiceResult<Option<Vec<String>>> {
        Ok(self.authoritative.read().get(attribute_name).cloned())
    }
}

/// Account reader serving a fixed set of accounts
pub struct StaticAccountReader {
    accounts: HashMap<EntityId, AccountEntity>,
}

impl StaticAccountReader {
    /// Reader serving the given accounts.
    pub fn new(accounts: Vec<AccountEntity>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.id.clone(), account))
                .collect(),
        }
    }
}

#[async_trait]
impl AccountReader for StaticAccountReader {
    async fn find_by_id(&self, entity_id: &EntityId) -> ServiceResult<Option<AccountEntity>> {
        Ok(self.accounts.get(entity_id).cloned())
    }
}
