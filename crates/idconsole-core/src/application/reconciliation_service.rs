use crate::domain::attributes::{
    join_values, split_values, typed_form_value, AttributeDelta, AttributeRow,
};
use crate::domain::reconciliation::AttributeReconciliation;
use crate::ConsoleError;
use idconsole_interfaces::{
    AccountEntity, AccountReader, AttributeMappingService, ConnectorObjectReader, EntityId,
    FormDefinition, FormValue, FormValueService, MappingStrategy,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Non-fatal degradation recorded during a refresh
///
/// Fetch failures never take the view down; they degrade the affected
/// section and leave the rest usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationWarning {
    /// The target system could not produce the entity; named so the UI can
    /// tell the user which account on which system is unreachable
    TargetSystemUnreachable {
        /// Account uid on the target system
        account_uid: String,
        /// Name of the target system
        system_name: String,
    },

    /// A backend fetch failed and its section degraded to an empty state
    FetchFailed {
        /// What was being fetched
        resource: String,
        /// Why it failed
        reason: String,
    },
}

/// Loaded state of one reconciliation view
struct ViewState {
    account: AccountEntity,
    form_definition: FormDefinition,
    reconciliation: AttributeReconciliation,
}

/// Merges the live connector object of an account with its stored manual
/// overrides, tracks edits, and persists the minimal delta as typed EAV
/// values
///
/// Service clients are injected; the service holds no global state beyond
/// the currently loaded view.
pub struct AttributeReconciliationService {
    accounts: Arc<dyn AccountReader>,
    connector_objects: Arc<dyn ConnectorObjectReader>,
    form_values: Arc<dyn FormValueService>,
    mappings: Arc<dyn AttributeMappingService>,
    state: Option<ViewState>,
    warnings: Vec<ReconciliationWarning>,
}

impl AttributeReconciliationService {
    /// Create a service over the injected backend clients.
    pub fn new(
        accounts: Arc<dyn AccountReader>,
        connector_objects: Arc<dyn ConnectorObjectReader>,
        form_values: Arc<dyn FormValueService>,
        mappings: Arc<dyn AttributeMappingService>,
    ) -> Self {
        Self {
            accounts,
            connector_objects,
            form_values,
            mappings,
            state: None,
            warnings: Vec::new(),
        }
    }

    /// Warnings recorded by the last refresh.
    pub fn warnings(&self) -> &[ReconciliationWarning] {
        &self.warnings
    }

    /// The loaded account, once a refresh succeeded far enough to find it.
    pub fn account(&self) -> Option<&AccountEntity> {
        self.state.as_ref().map(|s| &s.account)
    }

    /// The working attribute rows of the loaded view.
    pub fn rows(&self) -> &[AttributeRow] {
        self.state
            .as_ref()
            .map(|s| s.reconciliation.rows())
            .unwrap_or(&[])
    }

    /// Fetch the account, its mapping strategies, its stored overrides, and
    /// its live connector object, and freeze the merged snapshot.
    ///
    /// The baseline is captured before any edit can be applied, so diffs
    /// are never computed against a torn snapshot. Every fetch failure
    /// degrades to a warning; the view stays interactive.
    pub async fn refresh(&mut self, entity_id: &EntityId) -> Result<(), ConsoleError> {
        self.state = None;
        self.warnings.clear();

        let account = match self.accounts.find_by_id(entity_id).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                warn!(entity = %entity_id.0, "account not found");
                self.warnings.push(ReconciliationWarning::FetchFailed {
                    resource: "account".to_string(),
                    reason: format!("Account not found: {}", entity_id.0),
                });
                return Ok(());
            }
            Err(error) => {
                warn!(entity = %entity_id.0, error = %error, "account fetch failed");
                self.warnings.push(ReconciliationWarning::FetchFailed {
                    resource: "account".to_string(),
                    reason: error.to_string(),
                });
                return Ok(());
            }
        };

        let strategies = match self.mappings.strategies(&account.mapping_id).await {
            Ok(strategies) => strategies,
            Err(error) => {
                warn!(mapping = %account.mapping_id.0, error = %error, "strategy fetch failed");
                self.warnings.push(ReconciliationWarning::FetchFailed {
                    resource: "mapping strategies".to_string(),
                    reason: error.to_string(),
                });
                HashMap::new()
            }
        };

        let form_definition = match self.form_values.definition(&account.form_definition_id).await
        {
            Ok(definition) => definition,
            Err(error) => {
                warn!(
                    form_definition = %account.form_definition_id.0,
                    error = %error,
                    "form definition fetch failed"
                );
                self.warnings.push(ReconciliationWarning::FetchFailed {
                    resource: "form definition".to_string(),
                    reason: error.to_string(),
                });
                FormDefinition::default()
            }
        };

        let stored = match self
            .form_values
            .load(&account.id, &account.form_definition_id)
            .await
        {
            Ok(values) => values,
            Err(error) => {
                warn!(entity = %account.id.0, error = %error, "override fetch failed");
                self.warnings.push(ReconciliationWarning::FetchFailed {
                    resource: "override values".to_string(),
                    reason: error.to_string(),
                });
                Vec::new()
            }
        };

        let rows = match self.connector_objects.read(entity_id).await {
            Ok(Some(object)) => {
                Self::build_rows(&object.attributes, &strategies, &stored)
            }
            Ok(None) => {
                info!(
                    account = %account.uid,
                    system = %account.system_name,
                    "target system cannot produce the entity"
                );
                self.warnings
                    .push(ReconciliationWarning::TargetSystemUnreachable {
                        account_uid: account.uid.clone(),
                        system_name: account.system_name.clone(),
                    });
                Vec::new()
            }
            Err(error) => {
                warn!(entity = %entity_id.0, error = %error, "connector object read failed");
                self.warnings.push(ReconciliationWarning::FetchFailed {
                    resource: "connector object".to_string(),
                    reason: error.to_string(),
                });
                Vec::new()
            }
        };

        debug!(entity = %entity_id.0, rows = rows.len(), "reconciliation view refreshed");
        self.state = Some(ViewState {
            account,
            form_definition,
            reconciliation: AttributeReconciliation::from_snapshot(entity_id.clone(), rows),
        });
        Ok(())
    }

    /// Apply a user edit to one row.
    pub fn edit(&mut self, key: usize, new_value: &str) -> Result<(), ConsoleError> {
        self.loaded_mut()?.reconciliation.edit(key, new_value)
    }

    /// Revert one row to the authoritative system-computed value and mark
    /// it to delete its stored override on save.
    pub async fn stop_override(&mut self, key: usize) -> Result<(), ConsoleError> {
        let (entity_id, name) = {
            let state = self.loaded()?;
            let row = state.reconciliation.row(key).ok_or_else(|| {
                ConsoleError::ValidationError(format!("Unknown attribute row: {}", key))
            })?;
            (state.account.id.clone(), row.name.clone())
        };

        let authoritative = self
            .mappings
            .authoritative_value(&entity_id, &name)
            .await?
            .map(|values| join_values(&values))
            .unwrap_or_default();

        self.loaded_mut()?
            .reconciliation
            .apply_stop_override(key, authoritative)
    }

    /// The delta that would be persisted by a save, shown to the user for
    /// confirmation.
    pub fn diff(&self) -> Vec<AttributeDelta> {
        self.state
            .as_ref()
            .map(|s| s.reconciliation.diff())
            .unwrap_or_default()
    }

    /// Persist the diff as one atomic typed-EAV batch, then refresh
    /// regardless of the outcome to reflect true server state.
    pub async fn save(&mut self) -> Result<(), ConsoleError> {
        let (entity_id, form_definition_id, batch) = {
            let state = self.loaded()?;
            let diff = state.reconciliation.diff();
            if diff.is_empty() {
                debug!("nothing to save");
                return Ok(());
            }

            let mut batch = Vec::new();
            for delta in &diff {
                batch.extend(Self::form_values_for(&state.form_definition, delta)?);
            }
            (
                state.account.id.clone(),
                state.account.form_definition_id.clone(),
                batch,
            )
        };

        info!(entity = %entity_id.0, values = batch.len(), "saving attribute overrides");
        let result = self
            .form_values
            .save(&entity_id, &form_definition_id, batch)
            .await;

        if let Err(error) = &result {
            warn!(entity = %entity_id.0, error = %error, "override save rejected");
        }

        // Reflect true server state whether or not the save went through.
        self.refresh(&entity_id).await?;
        result.map_err(ConsoleError::from)
    }

    fn loaded(&self) -> Result<&ViewState, ConsoleError> {
        self.state.as_ref().ok_or_else(|| {
            ConsoleError::ReconciliationStateError("No entity loaded; call refresh first".to_string())
        })
    }

    fn loaded_mut(&mut self) -> Result<&mut ViewState, ConsoleError> {
        self.state.as_mut().ok_or_else(|| {
            ConsoleError::ReconciliationStateError("No entity loaded; call refresh first".to_string())
        })
    }

    fn build_rows(
        attributes: &[idconsole_interfaces::ConnectorAttribute],
        strategies: &HashMap<String, MappingStrategy>,
        stored: &[FormValue],
    ) -> Vec<AttributeRow> {
        attributes
            .iter()
            .enumerate()
            .map(|(key, attribute)| {
                let value = join_values(&attribute.values);
                let stored_override = Self::stored_override(stored, &attribute.name);
                let is_role = strategies
                    .get(&attribute.name)
                    .map(MappingStrategy::is_role_managed)
                    .unwrap_or(false);

                AttributeRow {
                    key,
                    name: attribute.name.clone(),
                    value: value.clone(),
                    // A stored value equal to the live value is not an
                    // override.
                    overridden_value: stored_override.filter(|stored| stored != &value),
                    multi_value: attribute.multi_value,
                    is_role,
                    reset: false,
                }
            })
            .collect()
    }

    /// Flatten the stored EAV values of one attribute, ordered by `seq`.
    fn stored_override(stored: &[FormValue], name: &str) -> Option<String> {
        let mut values: Vec<&FormValue> = stored
            .iter()
            .filter(|v| v.code == name && v.value.is_some())
            .collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by_key(|v| v.seq);

        let rendered: Vec<String> = values
            .iter()
            .filter_map(|v| v.value.as_ref())
            .map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        Some(join_values(&rendered))
    }

    fn form_values_for(
        form_definition: &FormDefinition,
        delta: &AttributeDelta,
    ) -> Result<Vec<FormValue>, ConsoleError> {
        let definition = form_definition.attribute_by_code(&delta.name).ok_or_else(|| {
            ConsoleError::ValidationError(format!(
                "No form attribute is defined for '{}'",
                delta.name
            ))
        })?;

        if delta.reset {
            return Ok(vec![typed_form_value(definition, None, 0)?]);
        }

        let new_value = delta.new_value.as_deref().unwrap_or_default();
        if delta.multi_value {
            split_values(new_value)
                .iter()
                .enumerate()
                .map(|(seq, value)| {
                    let seq = u16::try_from(seq).map_err(|_| {
                        ConsoleError::ValidationError(format!(
                            "Attribute '{}' has too many values to persist",
                            delta.name
                        ))
                    })?;
                    typed_form_value(definition, Some(value), seq)
                })
                .collect()
        } else {
            Ok(vec![typed_form_value(definition, Some(new_value), 0)?])
        }
    }
}

impl std::fmt::Debug for AttributeReconciliationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeReconciliationService")
            .field("loaded", &self.state.is_some())
            .field("warnings", &self.warnings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use idconsole_interfaces::{
        ConnectorAttribute, ConnectorObject, FormAttributeDefinition, FormAttributeId,
        FormDefinitionId, MappingId, PersistentType, ServiceError, ServiceResult, SystemId,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    fn account() -> AccountEntity {
        AccountEntity {
            id: EntityId("account-1".to_string()),
            uid: "jdoe".to_string(),
            system_id: SystemId("sys-1".to_string()),
            system_name: "Corporate AD".to_string(),
            mapping_id: MappingId("mapping-1".to_string()),
            form_definition_id: FormDefinitionId("form-1".to_string()),
        }
    }

    fn form_definition() -> FormDefinition {
        FormDefinition {
            id: Some(FormDefinitionId("form-1".to_string())),
            attributes: vec![
                FormAttributeDefinition {
                    id: FormAttributeId("attr-mail".to_string()),
                    code: "mail".to_string(),
                    persistent_type: PersistentType::ShortText,
                    multi_value: false,
                },
                FormAttributeDefinition {
                    id: FormAttributeId("attr-groups".to_string()),
                    code: "groups".to_string(),
                    persistent_type: PersistentType::ShortText,
                    multi_value: true,
                },
            ],
        }
    }

    struct StubAccounts {
        account: Option<AccountEntity>,
    }

    #[async_trait]
    impl AccountReader for StubAccounts {
        async fn find_by_id(&self, _entity_id: &EntityId) -> ServiceResult<Option<AccountEntity>> {
            Ok(self.account.clone())
        }
    }

    struct StubConnectorObjects {
        object: ServiceResult<Option<ConnectorObject>>,
    }

    #[async_trait]
    impl ConnectorObjectReader for StubConnectorObjects {
        async fn read(&self, _entity_id: &EntityId) -> ServiceResult<Option<ConnectorObject>> {
            self.object.clone()
        }
    }

    struct StubFormValues {
        stored: Vec<FormValue>,
        saved: Mutex<Vec<Vec<FormValue>>>,
        fail_save: bool,
    }

    impl StubFormValues {
        fn new(stored: Vec<FormValue>) -> Self {
            Self {
                stored,
                saved: Mutex::new(Vec::new()),
                fail_save: false,
            }
        }
    }

    #[async_trait]
    impl FormValueService for StubFormValues {
        async fn definition(
            &self,
            _form_definition: &FormDefinitionId,
        ) -> ServiceResult<FormDefinition> {
            Ok(form_definition())
        }

        async fn load(
            &self,
            _owner: &EntityId,
            _form_definition: &FormDefinitionId,
        ) -> ServiceResult<Vec<FormValue>> {
            Ok(self.stored.clone())
        }

        async fn save(
            &self,
            _owner: &EntityId,
            _form_definition: &FormDefinitionId,
            values: Vec<FormValue>,
        ) -> ServiceResult<()> {
            self.saved.lock().unwrap().push(values);
            if self.fail_save {
                Err(ServiceError::PersistenceRejected("constraint".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct StubMappings {
        strategies: HashMap<String, MappingStrategy>,
        authoritative: Option<Vec<String>>,
    }

    #[async_trait]
    impl AttributeMappingService for StubMappings {
        async fn strategies(
            &self,
            _mapping_id: &MappingId,
        ) -> ServiceResult<HashMap<String, MappingStrategy>> {
            Ok(self.strategies.clone())
        }

        async fn authoritative_value(
            &self,
            _entity_id: &EntityId,
            _attribute_name: &str,
        ) -> ServiceResult<Option<Vec<String>>> {
            Ok(self.authoritative.clone())
        }
    }

    fn mail_object() -> ConnectorObject {
        ConnectorObject {
            attributes: vec![ConnectorAttribute {
                name: "mail".to_string(),
                values: vec!["a@x.com".to_string()],
                multi_value: false,
            }],
        }
    }

    fn stored_value(code: &str, value: serde_json::Value, seq: u16) -> FormValue {
        FormValue {
            form_attribute: FormAttributeId(format!("attr-{}", code)),
            code: code.to_string(),
            persistent_type: PersistentType::ShortText,
            value: Some(value),
            seq,
        }
    }

    fn service(
        object: ServiceResult<Option<ConnectorObject>>,
        stored: Vec<FormValue>,
        strategies: HashMap<String, MappingStrategy>,
        authoritative: Option<Vec<String>>,
    ) -> (AttributeReconciliationService, Arc<StubFormValues>) {
        let form_values = Arc::new(StubFormValues::new(stored));
        let service = AttributeReconciliationService::new(
            Arc::new(StubAccounts {
                account: Some(account()),
            }),
            Arc::new(StubConnectorObjects { object }),
            form_values.clone(),
            Arc::new(StubMappings {
                strategies,
                authoritative,
            }),
        );
        (service, form_values)
    }

    #[tokio::test]
    async fn test_refresh_builds_merged_view() {
        let (mut svc, _) = service(Ok(Some(mail_object())), Vec::new(), HashMap::new(), None);
        svc.refresh(&EntityId("account-1".to_string())).await.unwrap();

        assert!(svc.warnings().is_empty());
        let rows = svc.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "mail");
        assert_eq!(rows[0].value, "a@x.com");
        assert_eq!(rows[0].overridden_value, None);
    }

    #[tokio::test]
    async fn test_refresh_surfaces_stored_override_only_when_it_differs() {
        let stored = vec![
            stored_value("mail", json!("a@x.com"), 0), // equals live value
        ];
        let (mut svc, _) = service(Ok(Some(mail_object())), stored, HashMap::new(), None);
        svc.refresh(&EntityId("account-1".to_string())).await.unwrap();
        assert_eq!(svc.rows()[0].overridden_value, None);

        let stored = vec![stored_value("mail", json!("b@x.com"), 0)];
        let (mut svc, _) = service(Ok(Some(mail_object())), stored, HashMap::new(), None);
        svc.refresh(&EntityId("account-1".to_string())).await.unwrap();
        assert_eq!(svc.rows()[0].overridden_value.as_deref(), Some("b@x.com"));
    }

    #[tokio::test]
    async fn test_refresh_flags_role_managed_rows() {
        let mut strategies = HashMap::new();
        strategies.insert("mail".to_string(), MappingStrategy::AuthoritativeMerge);
        let (mut svc, _) = service(Ok(Some(mail_object())), Vec::new(), strategies, None);
        svc.refresh(&EntityId("account-1".to_string())).await.unwrap();

        assert!(svc.rows()[0].is_role);
        assert!(matches!(
            svc.edit(0, "x"),
            Err(ConsoleError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_target_degrades_to_warning() {
        let (mut svc, _) = service(Ok(None), Vec::new(), HashMap::new(), None);
        svc.refresh(&EntityId("account-1".to_string())).await.unwrap();

        assert!(svc.rows().is_empty());
        assert_eq!(
            svc.warnings(),
            &[ReconciliationWarning::TargetSystemUnreachable {
                account_uid: "jdoe".to_string(),
                system_name: "Corporate AD".to_string(),
            }]
        );
        // The view stays usable: a later refresh can still load.
        assert!(svc.account().is_some());
    }

    #[tokio::test]
    async fn test_connector_read_error_degrades_to_warning() {
        let (mut svc, _) = service(
            Err(ServiceError::CommunicationError("timeout".to_string())),
            Vec::new(),
            HashMap::new(),
            None,
        );
        svc.refresh(&EntityId("account-1".to_string())).await.unwrap();

        assert!(svc.rows().is_empty());
        assert!(matches!(
            svc.warnings()[0],
            ReconciliationWarning::FetchFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_edit_then_save_persists_single_typed_value() {
        let (mut svc, form_values) =
            service(Ok(Some(mail_object())), Vec::new(), HashMap::new(), None);
        let entity = EntityId("account-1".to_string());
        svc.refresh(&entity).await.unwrap();

        svc.edit(0, "b@x.com").unwrap();
        let diff = svc.diff();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].old_value, "a@x.com");
        assert_eq!(diff[0].new_value.as_deref(), Some("b@x.com"));

        svc.save().await.unwrap();

        let saved = form_values.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].len(), 1);
        assert_eq!(saved[0][0].code, "mail");
        assert_eq!(saved[0][0].value, Some(json!("b@x.com")));

        // Post-save refresh reloaded from the stubs, so edits are gone.
        assert!(svc.diff().is_empty());
    }

    #[tokio::test]
    async fn test_clearing_override_on_empty_system_value_persists_explicit_blank() {
        let object = ConnectorObject {
            attributes: vec![ConnectorAttribute {
                name: "mail".to_string(),
                values: Vec::new(),
                multi_value: false,
            }],
        };
        let stored = vec![stored_value("mail", json!("x@x.com"), 0)];
        let (mut svc, form_values) = service(Ok(Some(object)), stored, HashMap::new(), None);
        svc.refresh(&EntityId("account-1".to_string())).await.unwrap();
        assert_eq!(svc.rows()[0].overridden_value.as_deref(), Some("x@x.com"));

        svc.edit(0, "").unwrap();
        assert_eq!(svc.rows()[0].overridden_value, None);

        svc.save().await.unwrap();
        let saved = form_values.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0][0].value, Some(json!("")), "stale override replaced");
    }

    #[tokio::test]
    async fn test_multi_value_override_reconciliation_scenario() {
        let object = ConnectorObject {
            attributes: vec![ConnectorAttribute {
                name: "groups".to_string(),
                values: vec!["g1".to_string(), "g2".to_string()],
                multi_value: true,
            }],
        };
        let stored = vec![
            stored_value("groups", json!("g1"), 0),
            stored_value("groups", json!("g3"), 1),
        ];
        let (mut svc, form_values) = service(
            Ok(Some(object)),
            stored,
            HashMap::new(),
            Some(vec!["g1".to_string(), "g2".to_string()]),
        );
        let entity = EntityId("account-1".to_string());
        svc.refresh(&entity).await.unwrap();

        let row = &svc.rows()[0];
        assert_eq!(row.value, "g1\ng2");
        assert_eq!(row.overridden_value.as_deref(), Some("g1\ng3"));

        svc.stop_override(0).await.unwrap();
        let row = &svc.rows()[0];
        assert_eq!(row.value, "g1\ng2");
        assert!(row.reset);
        assert_eq!(row.overridden_value, None);

        svc.save().await.unwrap();
        let saved = form_values.saved.lock().unwrap();
        assert_eq!(saved[0].len(), 1);
        assert_eq!(saved[0][0].value, None, "reset persists a null value");
    }

    #[tokio::test]
    async fn test_multi_value_edit_splits_on_save() {
        let object = ConnectorObject {
            attributes: vec![ConnectorAttribute {
                name: "groups".to_string(),
                values: vec!["g1".to_string()],
                multi_value: true,
            }],
        };
        let (mut svc, form_values) = service(Ok(Some(object)), Vec::new(), HashMap::new(), None);
        svc.refresh(&EntityId("account-1".to_string())).await.unwrap();

        svc.edit(0, "g1\ng4").unwrap();
        svc.save().await.unwrap();

        let saved = form_values.saved.lock().unwrap();
        assert_eq!(saved[0].len(), 2);
        assert_eq!(saved[0][0].value, Some(json!("g1")));
        assert_eq!(saved[0][0].seq, 0);
        assert_eq!(saved[0][1].value, Some(json!("g4")));
        assert_eq!(saved[0][1].seq, 1);
    }

    #[tokio::test]
    async fn test_save_rejects_multi_value_beyond_sequence_range() {
        let object = ConnectorObject {
            attributes: vec![ConnectorAttribute {
                name: "groups".to_string(),
                values: vec!["g1".to_string()],
                multi_value: true,
            }],
        };
        let (mut svc, form_values) = service(Ok(Some(object)), Vec::new(), HashMap::new(), None);
        svc.refresh(&EntityId("account-1".to_string())).await.unwrap();

        let oversized = vec!["v"; usize::from(u16::MAX) + 2].join("\n");
        svc.edit(0, &oversized).unwrap();

        let result = svc.save().await;
        assert!(matches!(result, Err(ConsoleError::ValidationError(_))));
        assert!(form_values.saved.lock().unwrap().is_empty(), "nothing sent");
    }

    #[tokio::test]
    async fn test_save_failure_still_refreshes() {
        let form_values = Arc::new(StubFormValues {
            stored: Vec::new(),
            saved: Mutex::new(Vec::new()),
            fail_save: true,
        });
        let mut svc = AttributeReconciliationService::new(
            Arc::new(StubAccounts {
                account: Some(account()),
            }),
            Arc::new(StubConnectorObjects {
                object: Ok(Some(mail_object())),
            }),
            form_values.clone(),
            Arc::new(StubMappings {
                strategies: HashMap::new(),
                authoritative: None,
            }),
        );
        let entity = EntityId("account-1".to_string());
        svc.refresh(&entity).await.unwrap();
        svc.edit(0, "b@x.com").unwrap();

        let result = svc.save().await;
        assert!(matches!(
            result,
            Err(ConsoleError::Service(ServiceError::PersistenceRejected(_)))
        ));
        // The save was attempted and the view was reloaded afterwards.
        assert_eq!(form_values.saved.lock().unwrap().len(), 1);
        assert_eq!(svc.rows()[0].value, "a@x.com");
    }

    #[tokio::test]
    async fn test_save_with_empty_diff_is_a_no_op() {
        let (mut svc, form_values) =
            service(Ok(Some(mail_object())), Vec::new(), HashMap::new(), None);
        svc.refresh(&EntityId("account-1".to_string())).await.unwrap();

        svc.save().await.unwrap();
        assert!(form_values.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_operations_require_a_loaded_view() {
        let (mut svc, _) = service(Ok(Some(mail_object())), Vec::new(), HashMap::new(), None);

        assert!(matches!(
            svc.edit(0, "x"),
            Err(ConsoleError::ReconciliationStateError(_))
        ));
        assert!(matches!(
            svc.save().await,
            Err(ConsoleError::ReconciliationStateError(_))
        ));
        assert!(svc.diff().is_empty());
    }
}
