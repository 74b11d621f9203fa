//! `ConfigSchemaValidator`: validates a reported configuration blob
//! against a JSON schema carried by the constraint.

use crate::engine::ConstraintEngine;
use crate::error::OperatorError;
use crate::inputs::SchemaValidatorInput;
use crate::operators::OperatorScope;

impl ConstraintEngine {
    pub(crate) async fn apply_schema_validation(
        &self,
        input: &SchemaValidatorInput,
        scope: &OperatorScope,
    ) -> Result<bool, OperatorError> {
        if !input.only_for_subtypes.is_empty()
            && !input.only_for_subtypes.contains(&input.resource_subtype)
        {
            return Ok(true);
        }
        if input.except_subtypes.contains(&input.resource_subtype) {
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

        // Prefer the freshly reported configuration over the persisted one.
        let configuration = match (&scope.status_report, &scope.assignment) {
            (Some(report), _) => report.lock().await.configuration.clone(),
            (None, Some(assignment)) => assignment.lock().await.value.clone(),
            (None, None) => None,
        };
        let configuration = match configuration {
            None | Some(serde_json::Value::Null) => return Ok(true),
            Some(serde_json::Value::Object(obj)) if obj.is_empty() => return Ok(true),
            Some(value) => value,
        };

        if input.json_schema.is_empty() {
            return Err(OperatorError::EmptySchema);
        }
        let valid = self
            .services
            .schema_validator
            .validate(&input.json_schema, &configuration)
            .await?;
        Ok(valid)
    }
}
