use crate::ConsoleError;
use async_trait::async_trait;
use idconsole_interfaces::{ConnectorTypeDescriptor, EntityId, MappingId, SystemId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Value object: Wizard run ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WizardRunId(pub String);

impl WizardRunId {
    /// Generate a fresh run identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Value object: Step ID, unique within a wizard's current step list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub String);

/// Wizard run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStatus {
    /// Wizard created but not started
    Idle,

    /// A step is shown and navigation is available
    StepActive,

    /// The active step's executor is running; navigation is disabled
    Executing,

    /// Wizard finished from its terminal step
    Finished,

    /// Wizard cancelled by the user; context discarded
    Cancelled,
}

/// Accumulated cross-step state of one wizard run
///
/// Immutable by convention: update methods return a new context and the
/// engine replaces its copy wholesale, so step recomputation stays
/// idempotent for an unchanged context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardContext {
    /// Selected target system, once known
    pub system_id: Option<SystemId>,

    /// Selected attribute mapping, once known
    pub mapping_id: Option<MappingId>,

    /// Selected owner entity, once known
    pub owner_id: Option<EntityId>,

    /// Evolving connector-type descriptor returned by step execution
    pub connector_type: Option<ConnectorTypeDescriptor>,

    /// Index of the active step within the visible step list
    pub active_step: usize,
}

impl WizardContext {
    /// Context seeded with a connector-type descriptor.
    pub fn with_descriptor(descriptor: ConnectorTypeDescriptor) -> Self {
        Self {
            connector_type: Some(descriptor),
            ..Default::default()
        }
    }

    /// New context with the given target system selected.
    pub fn with_system(&self, system_id: SystemId) -> Self {
        let mut next = self.clone();
        next.system_id = Some(system_id);
        next
    }

    /// New context with the given mapping selected.
    pub fn with_mapping(&self, mapping_id: MappingId) -> Self {
        let mut next = self.clone();
        next.mapping_id = Some(mapping_id);
        next
    }

    /// New context with the given owner selected.
    pub fn with_owner(&self, owner_id: EntityId) -> Self {
        let mut next = self.clone();
        next.owner_id = Some(owner_id);
        next
    }

    /// New context carrying an updated connector-type descriptor.
    pub fn with_connector_type(&self, descriptor: ConnectorTypeDescriptor) -> Self {
        let mut next = self.clone();
        next.connector_type = Some(descriptor);
        next
    }

    /// New context pointing at a different active step.
    pub fn with_active_step(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.active_step = index;
        next
    }
}

/// Asynchronous backend action run when advancing past a step
///
/// Receives the engine's context (with the active step already stamped into
/// the descriptor's `wizard_step_name`) and returns the replacement context.
/// On failure the engine keeps its pre-call context, so a retry re-issues
/// the same call from scratch.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    /// Execute the step's backend action.
    async fn execute(&self, context: WizardContext) -> Result<WizardContext, ConsoleError>;
}

/// One inline validation message for a step's local form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    /// Field the message belongs to
    pub field: String,

    /// Human-readable message
    pub message: String,
}

/// Local form validation gate for a step
///
/// A typed form-state check over the context, replacing imperative access
/// to child form components.
pub trait StepValidator: Send + Sync {
    /// Validate the step's local form against the context. An empty error
    /// list means valid.
    fn validate(&self, context: &WizardContext) -> Result<(), Vec<ValidationMessage>>;
}

/// One step of a wizard
#[derive(Clone)]
pub struct WizardStep {
    /// Step identifier, unique within the current step list
    pub id: StepId,

    /// Display label (owned by the UI layer)
    pub label: String,

    /// Display help text (owned by the UI layer)
    pub help: Option<String>,

    /// Backend action run when advancing past this step
    pub executor: Option<Arc<dyn StepExecutor>>,

    /// Local form validation gate
    pub validator: Option<Arc<dyn StepValidator>>,

    /// Declares this step terminal, truncating the visible step list
    pub is_last: bool,

    /// Suppress the finish affordance on this step
    pub hide_finish_button: bool,
}

impl WizardStep {
    /// Create a plain step with no executor or validator.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: StepId(id.into()),
            label: label.into(),
            help: None,
            executor: None,
            validator: None,
            is_last: false,
            hide_finish_button: false,
        }
    }

    /// Attach help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach an executor.
    pub fn with_executor(mut self, executor: Arc<dyn StepExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Attach a validator.
    pub fn with_validator(mut self, validator: Arc<dyn StepValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Mark this step terminal.
    pub fn last(mut self) -> Self {
        self.is_last = true;
        self
    }

    /// Suppress the finish affordance.
    pub fn without_finish_button(mut self) -> Self {
        self.hide_finish_button = true;
        self
    }
}

impl fmt::Debug for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardStep")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("has_executor", &self.executor.is_some())
            .field("has_validator", &self.validator.is_some())
            .field("is_last", &self.is_last)
            .field("hide_finish_button", &self.hide_finish_button)
            .finish()
    }
}

/// Produces the step list of a wizard from its current context
///
/// Must be a pure function of the context: called on every recomputation
/// and required to return structurally equal step lists for equal contexts.
pub trait StepSource: Send + Sync {
    /// Compute the full (unpruned) step list for the context.
    fn steps(&self, context: &WizardContext) -> Vec<WizardStep>;
}

impl<F> StepSource for F
where
    F: Fn(&WizardContext) -> Vec<WizardStep> + Send + Sync,
{
    fn steps(&self, context: &WizardContext) -> Vec<WizardStep> {
        self(context)
    }
}

/// Truncate a step list after the first step declaring itself terminal.
///
/// A step returned with `is_last = true` cuts everything behind it, e.g. a
/// "no trusted certificate found" step shortening a seven-step wizard to
/// two.
pub fn prune_steps(mut steps: Vec<WizardStep>) -> Vec<WizardStep> {
    if let Some(position) = steps.iter().position(|s| s.is_last) {
        steps.truncate(position + 1);
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str) -> WizardStep {
        WizardStep::new(id, format!("Step {}", id))
    }

    #[test]
    fn test_context_updates_return_new_context() {
        let context = WizardContext::default();
        let updated = context.with_system(SystemId("sys-1".to_string()));

        assert_eq!(context.system_id, None);
        assert_eq!(updated.system_id, Some(SystemId("sys-1".to_string())));
        assert_eq!(updated.active_step, 0);

        let moved = updated.with_active_step(2);
        assert_eq!(updated.active_step, 0);
        assert_eq!(moved.active_step, 2);
    }

    #[test]
    fn test_prune_steps_truncates_after_terminal() {
        let steps = vec![step("a"), step("b").last(), step("c"), step("d")];
        let pruned = prune_steps(steps);

        let ids: Vec<&str> = pruned.iter().map(|s| s.id.0.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_prune_steps_keeps_full_list_without_terminal() {
        let pruned = prune_steps(vec![step("a"), step("b"), step("c")]);
        assert_eq!(pruned.len(), 3);
    }

    #[test]
    fn test_step_source_from_closure_is_idempotent() {
        let source = |context: &WizardContext| {
            let mut steps = vec![step("select-system")];
            if context.system_id.is_some() {
                steps.push(step("mapping"));
            }
            steps
        };

        let context = WizardContext::default();
        let first: Vec<StepId> = source.steps(&context).into_iter().map(|s| s.id).collect();
        let second: Vec<StepId> = source.steps(&context).into_iter().map(|s| s.id).collect();
        assert_eq!(first, second);

        let with_system = context.with_system(SystemId("sys-1".to_string()));
        assert_eq!(source.steps(&with_system).len(), 2);
    }

    #[test]
    fn test_step_builder() {
        let built = step("summary").with_help("Review the result").last();
        assert_eq!(built.id, StepId("summary".to_string()));
        assert_eq!(built.help.as_deref(), Some("Review the result"));
        assert!(built.is_last);
        assert!(!built.hide_finish_button);
        assert!(built.executor.is_none());
    }

    #[test]
    fn test_wizard_status_serialization() {
        let serialized = serde_json::to_string(&WizardStatus::Executing).unwrap();
        let deserialized: WizardStatus = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, WizardStatus::Executing);
    }
}
