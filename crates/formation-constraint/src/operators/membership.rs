//! `IsNotAssignedToAnyFormationOfType`: exclusivity across formations of
//! one template type.
//!
//! A resource may participate in at most one formation built from the
//! guarded template. The operator gathers the formations the resource
//! already belongs to and fails when any of them was built from the same
//! template.

use formation_types::ResourceType;
use tracing::debug;

use crate::engine::ConstraintEngine;
use crate::error::OperatorError;
use crate::inputs::MembershipInput;
use crate::registry::OperatorId;
use crate::services::ServiceError;

impl ConstraintEngine {
    pub(crate) async fn apply_membership_exclusivity(
        &self,
        input: &MembershipInput,
    ) -> Result<bool, OperatorError> {
        let formation_names = match input.resource_type {
            ResourceType::Tenant => {
                let internal_id = self
                    .services
                    .tenant_resolver
                    .internal_tenant_id(&input.resource_id)
                    .await?;
                self.services
                    .auto_assignments
                    .formation_names_for_tenant(&internal_id)
                    .await?
            }
            ResourceType::Application => {
                let label = self
                    .services
                    .labels
                    .label_value(
                        &input.tenant,
                        ResourceType::Application,
                        &input.resource_id,
                        &self.config.scenarios_label_key,
                    )
                    .await?;
                match label {
                    // Not labeled means not in any formation yet.
                    None => return Ok(true),
                    Some(value) => scenario_names(&value)?,
                }
            }
            other => {
                return Err(OperatorError::UnsupportedResourceType {
                    operator: OperatorId::IsNotAssignedToAnyFormationOfType.as_str(),
                    resource_type: other.to_string(),
                });
            }
        };

        if input
            .except_system_types
            .iter()
            .any(|t| t == &input.resource_subtype)
        {
            debug!(subtype = %input.resource_subtype, "subtype is exempt from exclusivity");
            return Ok(true);
        }
        if formation_names.is_empty() {
            return Ok(true);
        }

        let formations = self
            .services
            .formations
            .formations_by_names(&formation_names, &input.tenant)
            .await?;
        Ok(formations
            .iter()
            .all(|f| f.formation_template_id != input.formation_template_id))
    }
}

fn scenario_names(value: &serde_json::Value) -> Result<Vec<String>, OperatorError> {
    let items = value.as_array().ok_or_else(|| {
        OperatorError::Service(ServiceError::new("scenarios label is not an array"))
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_owned).ok_or_else(|| {
                OperatorError::Service(ServiceError::new(
                    "scenarios label contains a non-string entry",
                ))
            })
        })
        .collect()
}
