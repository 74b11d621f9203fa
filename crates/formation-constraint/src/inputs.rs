//! Typed operator inputs.
//!
//! One struct per operator, decoded from the constraint's rendered input
//! template. Decoding is strict about types but lenient about optional
//! fields; each input self-validates the fields its operator cannot run
//! without.

use formation_types::{AssignmentState, FormationOperation, ResourceType};
use serde::Deserialize;
use serde_json::Value;

use crate::registry::OperatorId;
use crate::template::{self, TemplateError, ValidatedInput};

/// Input of `IsNotAssignedToAnyFormationOfType`.
#[derive(Clone, Debug, Deserialize)]
pub struct MembershipInput {
    pub formation_template_id: String,
    pub resource_type: ResourceType,
    #[serde(default)]
    pub resource_subtype: String,
    pub resource_id: String,
    pub tenant: String,
    /// Resource subtypes exempt from the exclusivity rule.
    #[serde(default)]
    pub except_system_types: Vec<String>,
}

impl ValidatedInput for MembershipInput {
    fn validate(&self) -> Result<(), String> {
        if self.formation_template_id.is_empty() {
            return Err("formation_template_id is required".into());
        }
        if self.resource_id.is_empty() {
            return Err("resource_id is required".into());
        }
        Ok(())
    }
}

/// Input of `DoesNotContainResourceOfSubtype`.
#[derive(Clone, Debug, Deserialize)]
pub struct SubtypeExclusionInput {
    pub formation_name: String,
    pub resource_type: ResourceType,
    #[serde(default)]
    pub resource_subtype: String,
    pub resource_id: String,
    pub tenant: String,
}

impl ValidatedInput for SubtypeExclusionInput {
    fn validate(&self) -> Result<(), String> {
        if self.formation_name.is_empty() {
            return Err("formation_name is required".into());
        }
        if self.tenant.is_empty() {
            return Err("tenant is required".into());
        }
        Ok(())
    }
}

/// Input of `ContainsScenarioGroups`.
#[derive(Clone, Debug, Deserialize)]
pub struct ScenarioGroupsInput {
    pub resource_type: ResourceType,
    pub resource_id: String,
    #[serde(default)]
    pub tenant: String,
    #[serde(default)]
    pub required_scenario_groups: Vec<String>,
}

impl ValidatedInput for ScenarioGroupsInput {
    fn validate(&self) -> Result<(), String> {
        if self.resource_id.is_empty() {
            return Err("resource_id is required".into());
        }
        Ok(())
    }
}

/// Input of both notification-suppression operators.
#[derive(Clone, Debug, Deserialize)]
pub struct SuppressionInput {
    pub resource_type: ResourceType,
    #[serde(default)]
    pub resource_subtype: String,
    #[serde(default)]
    pub resource_id: String,
    pub source_resource_type: ResourceType,
    pub source_resource_id: String,
    pub tenant: String,
    #[serde(default)]
    pub formation_template_id: String,
    /// Source subtypes whose notifications stay enabled.
    #[serde(default)]
    pub except_subtypes: Vec<String>,
    /// Formation template names the suppression never applies to.
    #[serde(default)]
    pub except_formation_types: Vec<String>,
}

impl ValidatedInput for SuppressionInput {
    fn validate(&self) -> Result<(), String> {
        if self.source_resource_id.is_empty() {
            return Err("source_resource_id is required".into());
        }
        if self.tenant.is_empty() {
            return Err("tenant is required".into());
        }
        Ok(())
    }
}

/// Input of `ConfigSchemaValidator`.
#[derive(Clone, Debug, Deserialize)]
pub struct SchemaValidatorInput {
    #[serde(default)]
    pub json_schema: String,
    #[serde(default)]
    pub tenant: String,
    pub resource_type: ResourceType,
    #[serde(default)]
    pub resource_subtype: String,
    #[serde(default)]
    pub formation_template_id: String,
    /// When non-empty, only these subtypes are validated.
    #[serde(default)]
    pub only_for_subtypes: Vec<String>,
    #[serde(default)]
    pub except_subtypes: Vec<String>,
    #[serde(default)]
    pub except_formation_types: Vec<String>,
}

impl ValidatedInput for SchemaValidatorInput {
    fn validate(&self) -> Result<(), String> {
        if !self.only_for_subtypes.is_empty() && !self.except_subtypes.is_empty() {
            return Err("only_for_subtypes and except_subtypes are mutually exclusive".into());
        }
        Ok(())
    }
}

/// Input of `ConfigMutator`.
#[derive(Clone, Debug, Deserialize)]
pub struct ConfigMutatorInput {
    #[serde(default)]
    pub operation: Option<FormationOperation>,
    /// Replacement negotiation state, applied wholesale when present.
    #[serde(default)]
    pub state: Option<AssignmentState>,
    /// Replacement configuration blob, applied wholesale when present.
    #[serde(default)]
    pub modified_configuration: Option<Value>,
    /// When non-empty, the mutation only fires for these source subtypes.
    #[serde(default)]
    pub only_for_source_subtypes: Vec<String>,
    #[serde(default)]
    pub source_resource_type: Option<ResourceType>,
    #[serde(default)]
    pub source_resource_id: String,
    #[serde(default)]
    pub tenant: String,
}

impl ValidatedInput for ConfigMutatorInput {
    fn validate(&self) -> Result<(), String> {
        if self.state.is_none() && self.modified_configuration.is_none() {
            return Err("either state or modified_configuration must be set".into());
        }
        Ok(())
    }
}

/// Input of `RedirectNotification`.
#[derive(Clone, Debug, Deserialize)]
pub struct RedirectInput {
    #[serde(default)]
    pub should_redirect: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_template: Option<String>,
    #[serde(default)]
    pub operation: Option<FormationOperation>,
}

impl ValidatedInput for RedirectInput {
    fn validate(&self) -> Result<(), String> {
        if self.should_redirect && self.url.is_none() && self.url_template.is_none() {
            return Err("a redirect target (url or url_template) is required".into());
        }
        Ok(())
    }
}

/// Input of `AsynchronousFlowControl`: the formation operation in flight
/// plus the redirect target used when delivery must be retargeted to the
/// instance creator.
#[derive(Clone, Debug, Deserialize)]
pub struct FlowControlInput {
    pub operation: FormationOperation,
    #[serde(default)]
    pub should_redirect: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_template: Option<String>,
}

impl ValidatedInput for FlowControlInput {}

/// Input of `DestinationCreator`.
#[derive(Clone, Debug, Deserialize)]
pub struct DestinationInput {
    pub operation: FormationOperation,
}

impl ValidatedInput for DestinationInput {}

/// The decoded input, tagged by the operator it belongs to.
#[derive(Clone, Debug)]
pub enum OperatorInput {
    Membership(MembershipInput),
    SubtypeExclusion(SubtypeExclusionInput),
    ScenarioGroups(ScenarioGroupsInput),
    Suppression(SuppressionInput),
    LoopSuppression(SuppressionInput),
    SchemaValidator(SchemaValidatorInput),
    ConfigMutator(ConfigMutatorInput),
    Redirect(RedirectInput),
    Destination(DestinationInput),
    FlowControl(FlowControlInput),
}

impl OperatorInput {
    /// Renders and decodes `input_template` into the input type the given
    /// operator expects.
    pub fn render(
        operator: OperatorId,
        input_template: &str,
        context: &Value,
    ) -> Result<Self, TemplateError> {
        Ok(match operator {
            OperatorId::IsNotAssignedToAnyFormationOfType => {
                Self::Membership(template::render_input(input_template, context)?)
            }
            OperatorId::DoesNotContainResourceOfSubtype => {
                Self::SubtypeExclusion(template::render_input(input_template, context)?)
            }
            OperatorId::ContainsScenarioGroups => {
                Self::ScenarioGroups(template::render_input(input_template, context)?)
            }
            OperatorId::DoNotGenerateFormationAssignmentNotification => {
                Self::Suppression(template::render_input(input_template, context)?)
            }
            OperatorId::DoNotGenerateFormationAssignmentNotificationForLoops => {
                Self::LoopSuppression(template::render_input(input_template, context)?)
            }
            OperatorId::ConfigSchemaValidator => {
                Self::SchemaValidator(template::render_input(input_template, context)?)
            }
            OperatorId::ConfigMutator => {
                Self::ConfigMutator(template::render_input(input_template, context)?)
            }
            OperatorId::RedirectNotification => {
                Self::Redirect(template::render_input(input_template, context)?)
            }
            OperatorId::DestinationCreator => {
                Self::Destination(template::render_input(input_template, context)?)
            }
            OperatorId::AsynchronousFlowControl => {
                Self::FlowControl(template::render_input(input_template, context)?)
            }
        })
    }
}
