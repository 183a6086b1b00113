//! Builders for common wire-type fixtures

use idconsole_interfaces::{
    AccountEntity, ConnectorAttribute, ConnectorObject, ConnectorTypeDescriptor, EntityId,
    FormAttributeDefinition, FormAttributeId, FormDefinition, FormDefinitionId, FormValue,
    MappingId, PersistentType, SystemId,
};
use serde_json::Value;

/// Builder for [`AccountEntity`] fixtures.
#[derive(Debug, Clone)]
pub struct AccountBuilder {
    id: String,
    uid: String,
    system_name: String,
}

impl AccountBuilder {
    /// Account with default test identifiers.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uid: "jdoe".to_string(),
            system_name: "Test System".to_string(),
        }
    }

    /// Set the account uid on the target system.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    /// Set the target system's display name.
    pub fn with_system_name(mut self, name: impl Into<String>) -> Self {
        self.system_name = name.into();
        self
    }

    /// Build the account entity.
    pub fn build(self) -> AccountEntity {
        AccountEntity {
            id: EntityId(self.id.clone()),
            uid: self.uid,
            system_id: SystemId(format!("system-of-{}", self.id)),
            system_name: self.system_name,
            mapping_id: MappingId(format!("mapping-of-{}", self.id)),
            form_definition_id: FormDefinitionId(format!("form-of-{}", self.id)),
        }
    }
}

/// Builder for [`ConnectorObject`] fixtures.
#[derive(Debug, Clone, Default)]
pub struct ConnectorObjectBuilder {
    attributes: Vec<ConnectorAttribute>,
}

impl ConnectorObjectBuilder {
    /// Empty connector object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single-valued attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(ConnectorAttribute {
            name: name.into(),
            values: vec![value.into()],
            multi_value: false,
        });
        self
    }

    /// Add a multi-valued attribute.
    pub fn with_multi_attribute(
        mut self,
        name: impl Into<String>,
        values: &[&str],
    ) -> Self {
        self.attributes.push(ConnectorAttribute {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
            multi_value: true,
        });
        self
    }

    /// Build the connector object.
    pub fn build(self) -> ConnectorObject {
        ConnectorObject {
            attributes: self.attributes,
        }
    }
}

/// Builder for [`FormDefinition`] fixtures with short-text attributes.
#[derive(Debug, Clone)]
pub struct FormDefinitionBuilder {
    id: String,
    attributes: Vec<FormAttributeDefinition>,
}

impl FormDefinitionBuilder {
    /// Empty form definition.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Vec::new(),
        }
    }

    /// Add a short-text attribute named after its code.
    pub fn with_short_text(self, code: impl Into<String>) -> Self {
        self.with_attribute(code, PersistentType::ShortText, false)
    }

    /// Add a multi-valued short-text attribute.
    pub fn with_multi_short_text(self, code: impl Into<String>) -> Self {
        self.with_attribute(code, PersistentType::ShortText, true)
    }

    /// Add an attribute with an explicit persistent type.
    pub fn with_attribute(
        mut self,
        code: impl Into<String>,
        persistent_type: PersistentType,
        multi_value: bool,
    ) -> Self {
        let code = code.into();
        self.attributes.push(FormAttributeDefinition {
            id: FormAttributeId(format!("attr-{}", code)),
            code,
            persistent_type,
            multi_value,
        });
        self
    }

    /// Build the form definition.
    pub fn build(self) -> FormDefinition {
        FormDefinition {
            id: Some(FormDefinitionId(self.id)),
            attributes: self.attributes,
        }
    }
}

/// A stored short-text form value for the attribute code, positioned by `seq`.
pub fn short_text_value(code: &str, value: impl Into<Value>, seq: u16) -> FormValue {
    FormValue {
        form_attribute: FormAttributeId(format!("attr-{}", code)),
        code: code.to_string(),
        persistent_type: PersistentType::ShortText,
        value: Some(value.into()),
        seq,
    }
}

/// A connector-type descriptor whose form definition declares the given
/// short-text codes.
pub fn descriptor_with_codes(name: &str, codes: &[&str]) -> ConnectorTypeDescriptor {
    let mut builder = FormDefinitionBuilder::new(format!("form-of-{}", name));
    for code in codes {
        builder = builder.with_short_text(*code);
    }

    let mut descriptor = ConnectorTypeDescriptor::new("acc", name);
    descriptor.form_definition = builder.build();
    descriptor
}
