//! Attribute rows of the reconciliation view and typed EAV conversion
//!
//! Multi-valued attributes are edited as a single newline-joined string and
//! split back on save; the order of values within one attribute is
//! preserved as returned by the connector.

use crate::ConsoleError;
use idconsole_interfaces::{FormAttributeDefinition, FormValue, PersistentType};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Separator used to flatten multi-valued attributes for editing
pub const MULTI_VALUE_SEPARATOR: char = '\n';

/// Join a sequence of attribute values into the editable representation.
pub fn join_values(values: &[String]) -> String {
    values.join("\n")
}

/// Split the editable representation back into a sequence of values.
///
/// The empty string maps to an empty sequence; round-trips are exact for
/// any sequence without embedded newlines.
pub fn split_values(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(MULTI_VALUE_SEPARATOR).map(String::from).collect()
}

/// One row of the merged attribute view
///
/// `value` is the live system value (newline-joined when multi-valued);
/// `overridden_value` is the manual replacement, where `None` means "no
/// override" and `Some("")` means "intentionally blanked".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRow {
    /// Stable position in the display list (insertion order)
    pub key: usize,

    /// Schema attribute name, unique per connector object
    pub name: String,

    /// Value read live from the target system
    pub value: String,

    /// Manual replacement, if one exists and differs from the live value
    pub overridden_value: Option<String>,

    /// Whether this attribute accepts many values
    pub multi_value: bool,

    /// Whether this attribute is role-managed and read-only
    pub is_role: bool,

    /// Whether the user requested reversion to the system value this session
    pub reset: bool,
}

impl AttributeRow {
    /// Row reflecting the live system state with no override.
    pub fn from_system(key: usize, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            value: value.into(),
            overridden_value: None,
            multi_value: false,
            is_role: false,
            reset: false,
        }
    }

    /// Mark the row multi-valued.
    pub fn multi(mut self) -> Self {
        self.multi_value = true;
        self
    }

    /// Mark the row role-managed.
    pub fn role_managed(mut self) -> Self {
        self.is_role = true;
        self
    }

    /// Attach a stored override.
    pub fn with_override(mut self, value: impl Into<String>) -> Self {
        self.overridden_value = Some(value.into());
        self
    }
}

/// One row of the confirmation diff, translated one-to-one into EAV writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDelta {
    /// Schema attribute name
    pub name: String,

    /// Previously effective value (stored override, else system value)
    pub old_value: String,

    /// New override value; `None` when the override is being removed
    pub new_value: Option<String>,

    /// Whether the attribute is multi-valued
    pub multi_value: bool,

    /// Whether this row clears its stored override
    pub reset: bool,
}

/// Convert one raw string into the typed EAV payload declared by the
/// attribute definition.
///
/// `raw = None` produces a null payload, which clears the stored override.
pub fn typed_form_value(
    definition: &FormAttributeDefinition,
    raw: Option<&str>,
    seq: u16,
) -> Result<FormValue, ConsoleError> {
    let value = match raw {
        None => None,
        Some(raw) => Some(parse_typed(definition, raw)?),
    };

    Ok(FormValue {
        form_attribute: definition.id.clone(),
        code: definition.code.clone(),
        persistent_type: definition.persistent_type,
        value,
        seq,
    })
}

fn parse_typed(definition: &FormAttributeDefinition, raw: &str) -> Result<Value, ConsoleError> {
    match definition.persistent_type {
        PersistentType::ShortText | PersistentType::Text | PersistentType::ByteArray => {
            Ok(Value::String(raw.to_string()))
        }
        PersistentType::Boolean => raw.parse::<bool>().map(Value::Bool).map_err(|_| {
            ConsoleError::ValidationError(format!(
                "Attribute '{}' expects a boolean, got '{}'",
                definition.code, raw
            ))
        }),
        PersistentType::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::String(c.to_string())),
                _ => Err(ConsoleError::ValidationError(format!(
                    "Attribute '{}' expects a single character, got '{}'",
                    definition.code, raw
                ))),
            }
        }
        PersistentType::Long | PersistentType::Int => {
            raw.parse::<i64>().map(|n| Value::Number(n.into())).map_err(|_| {
                ConsoleError::ValidationError(format!(
                    "Attribute '{}' expects an integer, got '{}'",
                    definition.code, raw
                ))
            })
        }
        PersistentType::Double => {
            let parsed = raw.parse::<f64>().map_err(|_| {
                ConsoleError::ValidationError(format!(
                    "Attribute '{}' expects a number, got '{}'",
                    definition.code, raw
                ))
            })?;
            Number::from_f64(parsed).map(Value::Number).ok_or_else(|| {
                ConsoleError::ValidationError(format!(
                    "Attribute '{}' expects a finite number, got '{}'",
                    definition.code, raw
                ))
            })
        }
    }
}
