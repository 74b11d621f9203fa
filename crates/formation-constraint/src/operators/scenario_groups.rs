//! `ContainsScenarioGroups`: onboarding-token gate for membership changes.
//!
//! A resource may join only when one of its consumed one-time tokens was
//! issued for one of the required scenario groups. Token scenario-group
//! entries appear in two encodings, a legacy plain string and a structured
//! object with a `key` field; both are accepted.

use formation_types::ResourceType;

use crate::engine::ConstraintEngine;
use crate::error::OperatorError;
use crate::inputs::ScenarioGroupsInput;
use crate::registry::OperatorId;

impl ConstraintEngine {
    pub(crate) async fn apply_scenario_groups(
        &self,
        input: &ScenarioGroupsInput,
    ) -> Result<bool, OperatorError> {
        if input.resource_type != ResourceType::Application {
            return Err(OperatorError::UnsupportedResourceType {
                operator: OperatorId::ContainsScenarioGroups.as_str(),
                resource_type: input.resource_type.to_string(),
            });
        }
        if input.required_scenario_groups.is_empty() {
            return Ok(true);
        }

        let tokens = self
            .services
            .system_auths
            .one_time_tokens_for_application(&input.resource_id)
            .await?;
        for token in tokens.iter().filter(|t| t.used) {
            for entry in &token.scenario_groups {
                if let Some(key) = scenario_group_key(entry)
                    && input.required_scenario_groups.iter().any(|g| g == key)
                {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

fn scenario_group_key(entry: &serde_json::Value) -> Option<&str> {
    match entry {
        serde_json::Value::String(key) => Some(key),
        serde_json::Value::Object(obj) => obj.get("key").and_then(|k| k.as_str()),
        _ => None,
    }
}
