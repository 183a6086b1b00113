//! Backend service contracts for the identity console core
//!
//! This crate defines the interfaces the console engines consume to talk to
//! the identity-management backend: connector-type wizard execution,
//! connector object reads, extensible-attribute (EAV) form values, attribute
//! mapping strategies, and account lookups. Implementations live outside
//! this workspace; the engines only ever see these traits.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Service traits and the service error type
pub mod services;

/// Wire types shared between the console and the backend
pub mod types;

pub use services::{
    AccountReader, AttributeMappingService, ConnectorObjectReader, ConnectorTypeExecution,
    FormValueService, ServiceError, ServiceResult,
};
pub use types::{
    AccountEntity, ConnectorAttribute, ConnectorObject, ConnectorTypeDescriptor, EntityId,
    FormAttributeDefinition, FormAttributeId, FormAttributeValue, FormDefinition,
    FormDefinitionId, FormValue, MappingId, MappingStrategy, PersistentType, SystemId,
};
