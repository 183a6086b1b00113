//! Mock implementations of the backend service traits.

use async_trait::async_trait;
use mockall::mock;
use std::collections::HashMap;

use idconsole_interfaces::{
    AccountEntity, AccountReader, AttributeMappingService, ConnectorObject,
    ConnectorObjectReader, ConnectorTypeDescriptor, ConnectorTypeExecution, EntityId,
    FormDefinition, FormDefinitionId, FormValue, FormValueService, MappingId, MappingStrategy,
    ServiceResult,
};

mock! {
    pub ConnectorTypeExecution {}

    #[async_trait]
    impl ConnectorTypeExecution for ConnectorTypeExecution {
        async fn execute(
            &self,
            descriptor: ConnectorTypeDescriptor,
        ) -> ServiceResult<ConnectorTypeDescriptor>;
    }
}

mock! {
    pub ConnectorObjectReader {}

    #[async_trait]
    impl ConnectorObjectReader for ConnectorObjectReader {
        async fn read(&self, entity_id: &EntityId) -> ServiceResult<Option<ConnectorObject>>;
    }
}

mock! {
    pub FormValueService {}

    #[async_trait]
    impl FormValueService for FormValueService {
        async fn definition(
            &self,
            form_definition: &FormDefinitionId,
        ) -> ServiceResult<FormDefinition>;

        async fn load(
            &self,
            owner: &EntityId,
            form_definition: &FormDefinitionId,
        ) -> ServiceResult<Vec<FormValue>>;

        async fn save(
            &self,
            owner: &EntityId,
            form_definition: &FormDefinitionId,
            values: Vec<FormValue>,
        ) -> ServiceResult<()>;
    }
}

mock! {
    pub AttributeMappingService {}

    #[async_trait]
    impl AttributeMappingService for AttributeMappingService {
        async fn strategies(
            &self,
            mapping_id: &MappingId,
        ) -> ServiceResult<HashMap<String, MappingStrategy>>;

        async fn authoritative_value(
            &self,
            entity_id: &EntityId,
            attribute_name: &str,
        ) -> ServiceResult<Option<Vec<String>>>;
    }
}

mock! {
    pub AccountReader {}

    #[async_trait]
    impl AccountReader for AccountReader {
        async fn find_by_id(&self, entity_id: &EntityId) -> ServiceResult<Option<AccountEntity>>;
    }
}

/// Creates a mock execution endpoint that echoes descriptors back unchanged.
pub fn create_mock_connector_type_execution() -> MockConnectorTypeExecution {
    let mut mock = MockConnectorTypeExecution::new();
    mock.expect_execute().returning(Ok);
    mock
}

/// Creates a mock connector object reader that finds nothing.
pub fn create_mock_connector_object_reader() -> MockConnectorObjectReader {
    let mut mock = MockConnectorObjectReader::new();
    mock.expect_read().returning(|_| Ok(None));
    mock
}

/// Creates a mock form value service with an empty definition and no
/// stored values; saves succeed.
pub fn create_mock_form_value_service() -> MockFormValueService {
    let mut mock = MockFormValueService::new();
    mock.expect_definition()
        .returning(|id| {
            Ok(FormDefinition {
                id: Some(id.clone()),
                attributes: Vec::new(),
            })
        });
    mock.expect_load().returning(|_, _| Ok(Vec::new()));
    mock.expect_save().returning(|_, _, _| Ok(()));
    mock
}

/// Creates a mock mapping service with no strategies and no authoritative
/// values.
pub fn create_mock_mapping_service() -> MockAttributeMappingService {
    let mut mock = MockAttributeMappingService::new();
    mock.expect_strategies().returning(|_| Ok(HashMap::new()));
    mock.expect_authoritative_value().returning(|_, _| Ok(None));
    mock
}

/// Creates a mock account reader that finds nothing.
pub fn create_mock_account_reader() -> MockAccountReader {
    let mut mock = MockAccountReader::new();
    mock.expect_find_by_id().returning(|_| Ok(None));
    mock
}
