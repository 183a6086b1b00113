//! Wire types exchanged with the identity-management backend
//!
//! These structs mirror the REST payloads of the backend services: the
//! connector-type descriptor driving wizard execution, the connector object
//! snapshot read from a target system, and the typed extensible-attribute
//! (EAV) values persisted against a form definition.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Value object: identifier of an entity (account, system entity) owned by the console
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

/// Value object: identifier of a target system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SystemId(pub String);

/// Value object: identifier of a system attribute mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingId(pub String);

/// Value object: identifier of an EAV form definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormDefinitionId(pub String);

/// Value object: identifier of a single form attribute within a form definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormAttributeId(pub String);

/// Persistent type of an EAV form attribute, as declared by its form definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersistentType {
    /// Short text (bounded string)
    #[serde(rename = "SHORTTEXT")]
    ShortText,
    /// Boolean
    #[serde(rename = "BOOLEAN")]
    Boolean,
    /// Free text (unbounded string)
    #[serde(rename = "TEXT")]
    Text,
    /// Single character
    #[serde(rename = "CHAR")]
    Char,
    /// Long integer
    #[serde(rename = "LONG")]
    Long,
    /// Double-precision float
    #[serde(rename = "DOUBLE")]
    Double,
    /// Integer, transported as long
    #[serde(rename = "INT")]
    Int,
    /// Byte array
    #[serde(rename = "BYTEARRAY")]
    ByteArray,
}

/// Strategy governing how a mapped attribute value is computed on the target system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingStrategy {
    /// Value is set only when the entity is created
    Create,
    /// Value is set on every provisioning operation
    Set,
    /// Value is set only when the target attribute is empty
    WriteIfNull,
    /// Values from all assigned roles are merged
    Merge,
    /// Values from all assigned roles are merged and the merge is authoritative
    AuthoritativeMerge,
}

impl MappingStrategy {
    /// Whether attribute values under this strategy are role-managed and
    /// must not be hand-edited.
    pub fn is_role_managed(&self) -> bool {
        matches!(self, Self::Merge | Self::AuthoritativeMerge)
    }
}

/// Definition of one form attribute inside a form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormAttributeDefinition {
    /// Attribute identifier
    pub id: FormAttributeId,

    /// Attribute code, unique within the form definition
    pub code: String,

    /// Declared persistent type of stored values
    pub persistent_type: PersistentType,

    /// Whether the attribute accepts multiple values
    #[serde(default)]
    pub multi_value: bool,
}

/// Schema describing the attributes a connector-type descriptor carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Form definition identifier
    pub id: Option<FormDefinitionId>,

    /// Attribute definitions, in declaration order
    #[serde(default)]
    pub attributes: Vec<FormAttributeDefinition>,
}

impl FormDefinition {
    /// Find an attribute definition by its code.
    pub fn attribute_by_code(&self, code: &str) -> Option<&FormAttributeDefinition> {
        self.attributes.iter().find(|a| a.code == code)
    }

    /// Find an attribute definition by its identifier.
    pub fn attribute_by_id(&self, id: &FormAttributeId) -> Option<&FormAttributeDefinition> {
        self.attributes.iter().find(|a| &a.id == id)
    }
}

/// One form-attribute/value pair carried by a connector-type descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormAttributeValue {
    /// Identifier of the form attribute this value belongs to
    pub form_attribute: FormAttributeId,

    /// Current value, `None` when unset
    pub value: Option<Value>,
}

/// Server-defined bundle describing a wizard's accumulated state and schema
///
/// Created by the first wizard step's execution call and evolved by every
/// subsequent one; discarded when the wizard closes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorTypeDescriptor {
    /// Backend module providing this connector type
    pub module: String,

    /// Connector type name, selects the wizard variant
    pub name: String,

    /// String metadata exchanged with the execution endpoint
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Current state of all known extensible attributes, in order
    #[serde(default)]
    pub values: Vec<FormAttributeValue>,

    /// Schema interpreting `values`
    #[serde(default)]
    pub form_definition: FormDefinition,

    /// Last step that successfully executed; drives idempotent resume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wizard_step_name: Option<String>,
}

impl ConnectorTypeDescriptor {
    /// Create a descriptor for the given module and connector type name.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Look up a metadata entry.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Insert or replace a metadata entry.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Current value for the attribute with the given code, if the schema
    /// declares it and a value is present.
    pub fn value_by_code(&self, code: &str) -> Option<&Value> {
        let attribute = self.form_definition.attribute_by_code(code)?;
        self.values
            .iter()
            .find(|v| v.form_attribute == attribute.id)
            .and_then(|v| v.value.as_ref())
    }

    /// Set the value for the attribute with the given code. Returns false
    /// when the schema does not declare the code.
    pub fn set_value_by_code(&mut self, code: &str, value: Value) -> bool {
        let Some(attribute) = self.form_definition.attribute_by_code(code) else {
            return false;
        };
        let id = attribute.id.clone();
        match self.values.iter_mut().find(|v| v.form_attribute == id) {
            Some(existing) => existing.value = Some(value),
            None => self.values.push(FormAttributeValue {
                form_attribute: id,
                value: Some(value),
            }),
        }
        true
    }
}

/// One attribute read live from a target system through a connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorAttribute {
    /// Schema attribute name, unique per connector object
    pub name: String,

    /// Values as returned by the connector, order preserved
    #[serde(default)]
    pub values: Vec<String>,

    /// Whether the attribute accepts many values
    #[serde(default)]
    pub multi_value: bool,
}

/// Live representation of an entity's attributes on the target system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorObject {
    /// Attributes in the order produced by the connector
    #[serde(default)]
    pub attributes: Vec<ConnectorAttribute>,
}

impl ConnectorObject {
    /// Find an attribute by name (case-sensitive).
    pub fn attribute(&self, name: &str) -> Option<&ConnectorAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A typed extensible-attribute value persisted against a form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormValue {
    /// Identifier of the form attribute this value belongs to
    pub form_attribute: FormAttributeId,

    /// Attribute code, for readability of persisted payloads
    pub code: String,

    /// Declared persistent type the payload is keyed by
    pub persistent_type: PersistentType,

    /// Typed payload; `None` clears any stored override
    pub value: Option<Value>,

    /// Position among multiple values of one attribute
    #[serde(default)]
    pub seq: u16,
}

/// The console-side entity owning a reconciliation view (an account on a system)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountEntity {
    /// Entity identifier
    pub id: EntityId,

    /// Account uid on the target system
    pub uid: String,

    /// Owning target system
    pub system_id: SystemId,

    /// Name of the owning target system, for user-facing messages
    pub system_name: String,

    /// Attribute mapping applied to this account
    pub mapping_id: MappingId,

    /// Form definition holding the account's override values
    pub form_definition_id: FormDefinitionId,
}
