use crate::domain::events::{
    DomainEvent, WizardCancelled, WizardFinished, WizardStarted, WizardStepCompleted,
    WizardStepFailed,
};
use crate::domain::wizard::{
    prune_steps, StepExecutor, StepSource, ValidationMessage, WizardContext, WizardRunId,
    WizardStatus, WizardStep,
};
use crate::ConsoleError;
use async_trait::async_trait;
use chrono::Utc;
use idconsole_interfaces::ConnectorTypeExecution;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of an advance attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The step's local form was invalid; the wizard stayed on the step
    /// with inline validation messages recorded
    Invalid,

    /// The wizard moved to the next step
    Advanced,

    /// The step's executor failed; the wizard stayed on the step with the
    /// error recorded and the pre-call context intact
    Failed,
}

/// An advance whose executor has not been run yet
#[derive(Debug)]
pub enum BeginAdvance {
    /// Validation failed; nothing to execute
    Invalid,

    /// The step has no executor; the wizard already advanced
    Advanced,

    /// The executor must be run and its result fed back through
    /// [`WizardEngine::complete_advance`]
    Pending(PendingExecution),
}

/// The executor call of one advance, detached from the engine
///
/// Holds a clone of the engine context with the active step's id already
/// stamped into the descriptor's `wizard_step_name`, so a retry re-issues
/// an identical, idempotent request.
pub struct PendingExecution {
    executor: Arc<dyn StepExecutor>,
    context: WizardContext,
}

impl PendingExecution {
    /// Run the executor to completion.
    pub async fn run(self) -> Result<WizardContext, ConsoleError> {
        self.executor.execute(self.context).await
    }
}

impl std::fmt::Debug for PendingExecution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingExecution")
            .field("active_step", &self.context.active_step)
            .finish()
    }
}

/// Drives one wizard run: step recomputation, validation gating, backend
/// execution, and the `Idle -> StepActive -> Executing -> … -> Finished |
/// Cancelled` state machine
///
/// The engine owns the [`WizardContext`]; step executors receive a clone
/// and return the replacement, so the pre-call context stays valid when an
/// execution fails.
pub struct WizardEngine {
    run_id: WizardRunId,
    source: Arc<dyn StepSource>,
    status: WizardStatus,
    context: WizardContext,
    last_error: Option<ConsoleError>,
    validation_messages: Vec<ValidationMessage>,
    events: Vec<Box<dyn DomainEvent>>,
}

impl WizardEngine {
    /// Create an idle engine over a step source and an initial context.
    pub fn new(source: Arc<dyn StepSource>, context: WizardContext) -> Self {
        Self {
            run_id: WizardRunId::generate(),
            source,
            status: WizardStatus::Idle,
            context,
            last_error: None,
            validation_messages: Vec::new(),
            events: Vec::new(),
        }
    }

    /// The run identifier.
    pub fn run_id(&self) -> &WizardRunId {
        &self.run_id
    }

    /// Current status.
    pub fn status(&self) -> WizardStatus {
        self.status
    }

    /// Current context.
    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    /// Error recorded by the last failed execution, if any.
    pub fn last_error(&self) -> Option<&ConsoleError> {
        self.last_error.as_ref()
    }

    /// Inline validation messages recorded by the last invalid advance.
    pub fn validation_messages(&self) -> &[ValidationMessage] {
        &self.validation_messages
    }

    /// Whether navigation controls are available. False while an executor
    /// runs and once the wizard has closed.
    pub fn navigation_enabled(&self) -> bool {
        self.status == WizardStatus::StepActive
    }

    /// The visible step list for the current context, recomputed on every
    /// call and truncated after the first terminal step.
    pub fn steps(&self) -> Vec<WizardStep> {
        prune_steps(self.source.steps(&self.context))
    }

    /// The active step, if the list is non-empty.
    pub fn active_step(&self) -> Option<WizardStep> {
        self.steps().into_iter().nth(self.context.active_step)
    }

    /// Whether the active step is the terminal visible step.
    pub fn on_terminal_step(&self) -> bool {
        let steps = self.steps();
        !steps.is_empty() && self.context.active_step == steps.len() - 1
    }

    /// Start the run, activating the first step.
    pub fn start(&mut self) -> Result<(), ConsoleError> {
        if self.status != WizardStatus::Idle {
            return Err(ConsoleError::WizardStateError(format!(
                "Cannot start wizard in state: {:?}",
                self.status
            )));
        }
        if self.steps().is_empty() {
            return Err(ConsoleError::WizardStateError(
                "Wizard has no steps for the initial context".to_string(),
            ));
        }

        self.status = WizardStatus::StepActive;
        self.record_event(Box::new(WizardStarted {
            wizard_run_id: self.run_id.clone(),
            timestamp: Utc::now(),
        }));
        info!(run_id = %self.run_id.0, "wizard started");
        Ok(())
    }

    /// Validate the active step and, when valid, hand back its pending
    /// executor call. Transitions to `Executing` when a call is pending;
    /// advances immediately when the step has no executor.
    pub fn begin_advance(&mut self) -> Result<BeginAdvance, ConsoleError> {
        if self.status != WizardStatus::StepActive {
            return Err(ConsoleError::WizardStateError(format!(
                "Cannot advance wizard in state: {:?}",
                self.status
            )));
        }

        let steps = self.steps();
        let step = steps.get(self.context.active_step).cloned().ok_or_else(|| {
            ConsoleError::WizardStateError(format!(
                "Active step {} is out of range",
                self.context.active_step
            ))
        })?;

        self.validation_messages.clear();
        if let Some(validator) = &step.validator {
            if let Err(messages) = validator.validate(&self.context) {
                debug!(
                    run_id = %self.run_id.0,
                    step = %step.id.0,
                    messages = messages.len(),
                    "step validation failed"
                );
                self.validation_messages = messages;
                return Ok(BeginAdvance::Invalid);
            }
        }

        let Some(executor) = step.executor.clone() else {
            self.advance_to_next(&step);
            return Ok(BeginAdvance::Advanced);
        };

        // Stamp the step name before the call so retries are idempotent
        // per step on the execution endpoint.
        let mut context = self.context.clone();
        if let Some(descriptor) = context.connector_type.as_mut() {
            descriptor.wizard_step_name = Some(step.id.0.clone());
        }

        self.status = WizardStatus::Executing;
        debug!(run_id = %self.run_id.0, step = %step.id.0, "executing wizard step");
        Ok(BeginAdvance::Pending(PendingExecution { executor, context }))
    }

    /// Apply the result of a pending execution: advance on success, stay on
    /// the step with the error recorded on failure.
    pub fn complete_advance(
        &mut self,
        result: Result<WizardContext, ConsoleError>,
    ) -> Result<AdvanceOutcome, ConsoleError> {
        if self.status != WizardStatus::Executing {
            return Err(ConsoleError::WizardStateError(format!(
                "No execution in flight in state: {:?}",
                self.status
            )));
        }

        let step = {
            // Steps are recomputed against the pre-call context; the active
            // index is still valid because nothing moved while executing.
            self.status = WizardStatus::StepActive;
            self.active_step().ok_or_else(|| {
                ConsoleError::WizardStateError(format!(
                    "Active step {} is out of range",
                    self.context.active_step
                ))
            })?
        };

        match result {
            Ok(new_context) => {
                let index = self.context.active_step;
                self.context = new_context.with_active_step(index);
                self.last_error = None;
                self.advance_to_next(&step);
                Ok(AdvanceOutcome::Advanced)
            }
            Err(error) => {
                warn!(
                    run_id = %self.run_id.0,
                    step = %step.id.0,
                    error = %error,
                    "wizard step execution failed"
                );
                self.record_event(Box::new(WizardStepFailed {
                    wizard_run_id: self.run_id.clone(),
                    step_id: step.id.clone(),
                    error: error.to_string(),
                    timestamp: Utc::now(),
                }));
                self.last_error = Some(error);
                Ok(AdvanceOutcome::Failed)
            }
        }
    }

    /// Validate, execute, and apply in one call.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, ConsoleError> {
        match self.begin_advance()? {
            BeginAdvance::Invalid => Ok(AdvanceOutcome::Invalid),
            BeginAdvance::Advanced => Ok(AdvanceOutcome::Advanced),
            BeginAdvance::Pending(pending) => {
                let result = pending.run().await;
                self.complete_advance(result)
            }
        }
    }

    /// Apply a form edit to the context, e.g. a field bound on the active
    /// step. Rejected while an execution is in flight or the wizard is
    /// closed; the active step index is preserved, clamped into the step
    /// list recomputed from the edited context.
    pub fn update_context<F>(&mut self, edit: F) -> Result<(), ConsoleError>
    where
        F: FnOnce(&WizardContext) -> WizardContext,
    {
        if self.status != WizardStatus::StepActive {
            return Err(ConsoleError::WizardStateError(format!(
                "Cannot edit wizard context in state: {:?}",
                self.status
            )));
        }

        let index = self.context.active_step;
        self.context = edit(&self.context).with_active_step(index);

        // The edit may have reshaped the visible list; keep the pointer
        // inside it so navigation stays available.
        let last_index = self.steps().len().saturating_sub(1);
        if self.context.active_step > last_index {
            self.context = self.context.with_active_step(last_index);
        }
        Ok(())
    }

    /// Step back to the previous step without re-running executors.
    pub fn back(&mut self) -> Result<(), ConsoleError> {
        if self.status != WizardStatus::StepActive {
            return Err(ConsoleError::WizardStateError(format!(
                "Cannot step back in state: {:?}",
                self.status
            )));
        }
        if self.context.active_step == 0 {
            return Err(ConsoleError::WizardStateError(
                "Already on the first step".to_string(),
            ));
        }

        self.context = self.context.with_active_step(self.context.active_step - 1);
        self.validation_messages.clear();
        self.last_error = None;
        Ok(())
    }

    /// Finish the wizard from its terminal visible step and return the
    /// final context.
    pub fn finish(&mut self) -> Result<WizardContext, ConsoleError> {
        if self.status != WizardStatus::StepActive {
            return Err(ConsoleError::WizardStateError(format!(
                "Cannot finish wizard in state: {:?}",
                self.status
            )));
        }
        if !self.on_terminal_step() {
            return Err(ConsoleError::WizardStateError(
                "Finish is only available from the terminal step".to_string(),
            ));
        }

        self.status = WizardStatus::Finished;
        self.record_event(Box::new(WizardFinished {
            wizard_run_id: self.run_id.clone(),
            timestamp: Utc::now(),
        }));
        info!(run_id = %self.run_id.0, "wizard finished");
        Ok(std::mem::take(&mut self.context))
    }

    /// Cancel the run and discard the context. Work already committed
    /// server-side by prior steps is not rolled back.
    pub fn cancel(&mut self) -> Result<(), ConsoleError> {
        match self.status {
            WizardStatus::Finished | WizardStatus::Cancelled => {
                Err(ConsoleError::WizardStateError(format!(
                    "Cannot cancel wizard in state: {:?}",
                    self.status
                )))
            }
            _ => {
                self.status = WizardStatus::Cancelled;
                self.context = WizardContext::default();
                self.record_event(Box::new(WizardCancelled {
                    wizard_run_id: self.run_id.clone(),
                    timestamp: Utc::now(),
                }));
                info!(run_id = %self.run_id.0, "wizard cancelled");
                Ok(())
            }
        }
    }

    /// Get and clear all recorded domain events.
    pub fn take_events(&mut self) -> Vec<Box<dyn DomainEvent>> {
        std::mem::take(&mut self.events)
    }

    fn advance_to_next(&mut self, step: &WizardStep) {
        self.record_event(Box::new(WizardStepCompleted {
            wizard_run_id: self.run_id.clone(),
            step_id: step.id.clone(),
            timestamp: Utc::now(),
        }));

        // The terminal step is left active for finish(); everything else
        // moves forward. The step list may have reshaped itself from the
        // new context, so the index is clamped to the visible list.
        let steps = self.steps();
        let last_index = steps.len().saturating_sub(1);
        let next = (self.context.active_step + 1).min(last_index);
        self.context = self.context.with_active_step(next);
    }

    fn record_event(&mut self, event: Box<dyn DomainEvent>) {
        self.events.push(event);
    }
}

impl std::fmt::Debug for WizardEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardEngine")
            .field("run_id", &self.run_id)
            .field("status", &self.status)
            .field("active_step", &self.context.active_step)
            .finish()
    }
}

/// Step executor calling the connector-type execution endpoint
///
/// The common executor for account/system creation wizards: sends the
/// context's descriptor to the backend and carries the returned descriptor
/// into the replacement context.
pub struct ConnectorTypeStepExecutor {
    execution: Arc<dyn ConnectorTypeExecution>,
}

impl ConnectorTypeStepExecutor {
    /// Create an executor over an execution service client.
    pub fn new(execution: Arc<dyn ConnectorTypeExecution>) -> Self {
        Self { execution }
    }
}

#[async_trait]
impl StepExecutor for ConnectorTypeStepExecutor {
    async fn execute(&self, context: WizardContext) -> Result<WizardContext, ConsoleError> {
        let descriptor = context.connector_type.clone().ok_or_else(|| {
            ConsoleError::StepExecutionError(
                "Context carries no connector-type descriptor".to_string(),
            )
        })?;

        let updated = self.execution.execute(descriptor).await?;
        Ok(context.with_connector_type(updated))
    }
}
