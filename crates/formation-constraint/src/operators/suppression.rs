//! Notification-suppression operators.
//!
//! Both variants decide whether an assignment notification should be
//! generated at all: `Ok(false)` at the generate-notification join point
//! means "do not notify". The loop variant only acts on self-loops, where
//! a resource is both source and target of the assignment.

use formation_types::ResourceType;

use crate::engine::ConstraintEngine;
use crate::error::OperatorError;
use crate::inputs::SuppressionInput;
use crate::registry::OperatorId;
use crate::services::ServiceError;

impl ConstraintEngine {
    pub(crate) async fn apply_notification_suppression(
        &self,
        input: &SuppressionInput,
        loops_only: bool,
    ) -> Result<bool, OperatorError> {
        if loops_only && input.source_resource_id != input.resource_id {
            return Ok(true);
        }

        if !input.except_formation_types.is_empty() {
            let template_name = self
                .services
                .formation_templates
                .template_name(&input.formation_template_id)
                .await?;
            if input.except_formation_types.contains(&template_name) {
                return Ok(true);
            }
        }

        let source_subtype = self.source_subtype(input).await?;
        Ok(input.except_subtypes.contains(&source_subtype))
    }

    /// The subtype label of the notification's source resource. Runtime
    /// contexts classify through their owning runtime.
    async fn source_subtype(&self, input: &SuppressionInput) -> Result<String, OperatorError> {
        let (object_type, object_id, label_key) = match input.source_resource_type {
            ResourceType::Application => (
                ResourceType::Application,
                input.source_resource_id.clone(),
                &self.config.application_type_label_key,
            ),
            ResourceType::Runtime => (
                ResourceType::Runtime,
                input.source_resource_id.clone(),
                &self.config.runtime_type_label_key,
            ),
            ResourceType::RuntimeContext => {
                let runtime_id = self
                    .services
                    .runtime_contexts
                    .runtime_id(&input.tenant, &input.source_resource_id)
                    .await?;
                (
                    ResourceType::Runtime,
                    runtime_id,
                    &self.config.runtime_type_label_key,
                )
            }
            other => {
                return Err(OperatorError::UnsupportedResourceType {
                    operator: OperatorId::DoNotGenerateFormationAssignmentNotification.as_str(),
                    resource_type: other.to_string(),
                });
            }
        };

        let label = self
            .services
            .labels
            .label_value(&input.tenant, object_type, &object_id, label_key)
            .await?;
        label
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                OperatorError::Service(ServiceError::new(format!(
                    "subtype label {label_key:?} not found for {object_type} {object_id:?}"
                )))
            })
    }
}
