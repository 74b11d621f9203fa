//! `ConfigMutator`: wholesale replacement of an assignment's negotiation
//! state and configuration blob.
//!
//! Mutations always replace, never merge. When a status report is in
//! scope the replacement is mirrored onto it so the orchestrator persists
//! the mutated view.

use crate::engine::ConstraintEngine;
use crate::error::OperatorError;
use crate::inputs::ConfigMutatorInput;
use crate::operators::OperatorScope;

impl ConstraintEngine {
    pub(crate) async fn apply_config_mutation(
        &self,
        input: &ConfigMutatorInput,
        scope: &OperatorScope,
    ) -> Result<bool, OperatorError> {
        if !input.only_for_source_subtypes.is_empty() {
            let Some(source_type) = input.source_resource_type else {
                return Ok(true);
            };
            let subtype = self
                .resolve_subtype(&input.tenant, source_type, &input.source_resource_id)
                .await?;
            match subtype {
                Some(subtype) if input.only_for_source_subtypes.contains(&subtype) => {}
                _ => return Ok(true),
            }
        }

        let assignment = scope.require_assignment()?;
        let mut assignment = assignment.lock().await;
        if let Some(state) = input.state {
            assignment.state = state;
        }
        if let Some(configuration) = &input.modified_configuration {
            assignment.value = Some(configuration.clone());
        }

        if let Some(report) = &scope.status_report {
            let mut report = report.lock().await;
            if let Some(state) = input.state {
                report.state = state;
            }
            if let Some(configuration) = &input.modified_configuration {
                report.configuration = Some(configuration.clone());
            }
        }
        Ok(true)
    }

    async fn resolve_subtype(
        &self,
        tenant: &str,
        resource_type: formation_types::ResourceType,
        resource_id: &str,
    ) -> Result<Option<String>, OperatorError> {
        use formation_types::ResourceType;
        let label_key = match resource_type {
            ResourceType::Application => &self.config.application_type_label_key,
            ResourceType::Runtime => &self.config.runtime_type_label_key,
            _ => return Ok(None),
        };
        let label = self
            .services
            .labels
            .label_value(tenant, resource_type, resource_id, label_key)
            .await?;
        Ok(label.as_ref().and_then(|v| v.as_str()).map(str::to_owned))
    }
}
