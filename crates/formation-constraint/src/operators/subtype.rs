//! `DoesNotContainResourceOfSubtype`: at most one resource of a given
//! subtype per formation.

use formation_types::ResourceType;

use crate::engine::ConstraintEngine;
use crate::error::OperatorError;
use crate::inputs::SubtypeExclusionInput;
use crate::registry::OperatorId;

impl ConstraintEngine {
    pub(crate) async fn apply_subtype_exclusion(
        &self,
        input: &SubtypeExclusionInput,
    ) -> Result<bool, OperatorError> {
        if input.resource_type != ResourceType::Application {
            return Err(OperatorError::UnsupportedResourceType {
                operator: OperatorId::DoesNotContainResourceOfSubtype.as_str(),
                resource_type: input.resource_type.to_string(),
            });
        }

        let member_ids = self
            .services
            .applications
            .application_ids_in_formation(&input.tenant, &input.formation_name)
            .await?;
        for member_id in member_ids {
            let label = self
                .services
                .labels
                .label_value(
                    &input.tenant,
                    ResourceType::Application,
                    &member_id,
                    &self.config.application_type_label_key,
                )
                .await?;
            // Members without a type label cannot collide on subtype.
            if label.as_ref().and_then(|v| v.as_str()) == Some(input.resource_subtype.as_str()) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
