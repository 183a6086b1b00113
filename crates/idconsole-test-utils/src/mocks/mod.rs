//! Mockall mocks for the backend service traits

mod services;

pub use services::{
    create_mock_account_reader, create_mock_connector_object_reader,
    create_mock_connector_type_execution, create_mock_form_value_service,
    create_mock_mapping_service, MockAccountReader, MockAttributeMappingService,
    MockConnectorObjectReader, MockConnectorTypeExecution, MockFormValueService,
};
