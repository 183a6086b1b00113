use crate::domain::attributes::{AttributeDelta, AttributeRow};
use crate::ConsoleError;
use idconsole_interfaces::EntityId;
use serde::{Deserialize, Serialize};

/// Aggregate: merged attribute view of one entity under edit
///
/// `original` is the immutable baseline captured once per refresh, strictly
/// before any user edit is applied; `rows` is the live working copy. The
/// persistence diff is always computed as `rows` versus `original`, never
/// against intermediate states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeReconciliation {
    /// Entity owning the view
    entity_id: EntityId,

    /// Live working copy
    rows: Vec<AttributeRow>,

    /// Frozen baseline snapshot
    original: Vec<AttributeRow>,
}

impl AttributeReconciliation {
    /// Freeze a fetched snapshot into a new editable view.
    pub fn from_snapshot(entity_id: EntityId, rows: Vec<AttributeRow>) -> Self {
        Self {
            entity_id,
            original: rows.clone(),
            rows,
        }
    }

    /// Entity owning the view.
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    /// The live working rows.
    pub fn rows(&self) -> &[AttributeRow] {
        &self.rows
    }

    /// The frozen baseline snapshot.
    pub fn original(&self) -> &[AttributeRow] {
        &self.original
    }

    /// A working row by its key.
    pub fn row(&self, key: usize) -> Option<&AttributeRow> {
        self.rows.get(key)
    }

    /// Apply a user edit to one row and recompute its override.
    ///
    /// Override recompute rule: an empty new value against a non-empty
    /// system value becomes the explicit empty override (intentionally
    /// blanked); an empty new value against an empty system value clears
    /// the override; typing the system value back clears the override only
    /// when no override was persisted; anything else becomes the override.
    pub fn edit(&mut self, key: usize, new_value: &str) -> Result<(), ConsoleError> {
        let original = self
            .original
            .get(key)
            .cloned()
            .ok_or_else(|| ConsoleError::ValidationError(format!("Unknown attribute row: {}", key)))?;

        let row = &mut self.rows[key];
        if row.is_role {
            return Err(ConsoleError::ValidationError(format!(
                "Attribute '{}' is role-managed and cannot be edited",
                row.name
            )));
        }

        row.value = new_value.to_string();
        row.reset = false;
        row.overridden_value = if new_value.is_empty() {
            if original.value.is_empty() {
                None
            } else {
                Some(String::new())
            }
        } else if new_value == original.value && original.overridden_value.is_none() {
            None
        } else {
            Some(new_value.to_string())
        };

        Ok(())
    }

    /// Revert one row to the authoritative system-computed value.
    ///
    /// The row keeps displaying the given value but is marked `reset`, so
    /// the save pass deletes its stored override even when the displayed
    /// value is unchanged.
    pub fn apply_stop_override(
        &mut self,
        key: usize,
        authoritative_value: String,
    ) -> Result<(), ConsoleError> {
        let row = self
            .rows
            .get_mut(key)
            .ok_or_else(|| ConsoleError::ValidationError(format!("Unknown attribute row: {}", key)))?;

        row.value = authoritative_value;
        row.overridden_value = None;
        row.reset = true;
        Ok(())
    }

    /// Compute the minimal delta to persist.
    ///
    /// A row is included iff it was explicitly reset, or its working
    /// override differs from both the persisted override and the original
    /// system value.
    pub fn diff(&self) -> Vec<AttributeDelta> {
        self.rows
            .iter()
            .zip(self.original.iter())
            .filter_map(|(row, original)| {
                let differs_from_persisted = row.overridden_value != original.overridden_value;
                let differs_from_system = match &row.overridden_value {
                    Some(working) => working != &original.value,
                    None => true,
                };

                if row.reset || (differs_from_persisted && differs_from_system) {
                    Some(AttributeDelta {
                        name: row.name.clone(),
                        old_value: original
                            .overridden_value
                            .clone()
                            .unwrap_or_else(|| original.value.clone()),
                        new_value: if row.reset {
                            None
                        } else {
                            row.overridden_value.clone()
                        },
                        multi_value: row.multi_value,
                        reset: row.reset,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Whether any row would be persisted by a save.
    pub fn is_dirty(&self) -> bool {
        !self.diff().is_empty()
    }
}
