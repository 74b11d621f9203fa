//! The constraint engine: selection, ordering, and evaluation of formation
//! constraints at a join point.

use std::sync::Arc;

use formation_types::{Constraint, JoinPointLocation};
use tracing::{debug, info, warn};

use crate::details::JoinPointDetails;
use crate::error::{
    ConstraintViolation, ConstraintViolations, EnforcementError, OperatorError, ViolationReason,
};
use crate::inputs::OperatorInput;
use crate::operators::OperatorScope;
use crate::registry::OperatorId;
use crate::services::{
    ApplicationLookup, AssignmentRepository, AutoAssignmentLookup, CertificateService,
    ConstraintStore, DestinationService, FormationLookup, FormationTemplateLookup, LabelLookup,
    NotificationService, RuntimeContextLookup, SchemaValidator, SystemAuthLookup, TenantResolver,
};

/// Label keys the operators read for subtype and scenario classification.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub application_type_label_key: String,
    pub runtime_type_label_key: String,
    pub scenarios_label_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            application_type_label_key: "applicationType".into(),
            runtime_type_label_key: "runtimeType".into(),
            scenarios_label_key: "scenarios".into(),
        }
    }
}

impl EngineConfig {
    pub fn with_application_type_label_key(mut self, key: impl Into<String>) -> Self {
        self.application_type_label_key = key.into();
        self
    }

    pub fn with_runtime_type_label_key(mut self, key: impl Into<String>) -> Self {
        self.runtime_type_label_key = key.into();
        self
    }

    pub fn with_scenarios_label_key(mut self, key: impl Into<String>) -> Self {
        self.scenarios_label_key = key.into();
        self
    }
}

/// The collaborators the engine and its operators call out to.
#[derive(Clone)]
pub struct Services {
    pub constraint_store: Arc<dyn ConstraintStore>,
    pub tenant_resolver: Arc<dyn TenantResolver>,
    pub auto_assignments: Arc<dyn AutoAssignmentLookup>,
    pub formations: Arc<dyn FormationLookup>,
    pub formation_templates: Arc<dyn FormationTemplateLookup>,
    pub labels: Arc<dyn LabelLookup>,
    pub applications: Arc<dyn ApplicationLookup>,
    pub runtime_contexts: Arc<dyn RuntimeContextLookup>,
    pub system_auths: Arc<dyn SystemAuthLookup>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub notifications: Arc<dyn NotificationService>,
    pub destinations: Arc<dyn DestinationService>,
    pub certificates: Arc<dyn CertificateService>,
    pub schema_validator: Arc<dyn SchemaValidator>,
}

pub struct ConstraintEngine {
    pub(crate) config: EngineConfig,
    pub(crate) services: Services,
}

impl ConstraintEngine {
    pub fn new(config: EngineConfig, services: Services) -> Self {
        Self { config, services }
    }

    /// Enforces every constraint matching the join point.
    ///
    /// All matching constraints are evaluated even after one fails;
    /// the returned violation batch names each failing constraint. A
    /// protocol breakdown inside an operator aborts immediately instead.
    pub async fn enforce_constraints(
        &self,
        location: JoinPointLocation,
        details: &JoinPointDetails,
        formation_template_id: &str,
    ) -> Result<(), EnforcementError> {
        let matching_key = details.matching_key();
        let mut constraints = self
            .services
            .constraint_store
            .list_matching_constraints(formation_template_id, location, &matching_key)
            .await
            .map_err(|source| EnforcementError::Store { location, source })?;
        if constraints.is_empty() {
            debug!(%location, "no constraints match the join point");
            return Ok(());
        }
        info!(%location, resource_type = %matching_key.resource_type,
            resource_subtype = %matching_key.resource_subtype, matched = constraints.len(),
            "enforcing constraints");
        order_for_evaluation(&mut constraints);

        let scope = OperatorScope::from_details(location, details);
        let mut violations = Vec::new();

        for constraint in &constraints {
            debug!(constraint = %constraint.name, operator = %constraint.operator, %location,
                "enforcing constraint");
            // Re-snapshot per constraint: an earlier operator may have
            // mutated the shared state the next template renders against.
            let context = details.template_context().await;
            let Some(operator) = OperatorId::parse(&constraint.operator) else {
                violations.push(ConstraintViolation {
                    constraint_name: constraint.name.clone(),
                    reason: ViolationReason::OperatorNotRegistered {
                        operator: constraint.operator.clone(),
                    },
                });
                continue;
            };
            let input = match OperatorInput::render(operator, &constraint.input_template, &context)
            {
                Ok(input) => input,
                Err(err) => {
                    violations.push(ConstraintViolation {
                        constraint_name: constraint.name.clone(),
                        reason: ViolationReason::InputTemplate {
                            operator: constraint.operator.clone(),
                            detail: err.to_string(),
                        },
                    });
                    continue;
                }
            };
            match self.apply_operator(operator, &input, &scope).await {
                Ok(true) => {}
                Ok(false) => violations.push(ConstraintViolation {
                    constraint_name: constraint.name.clone(),
                    reason: ViolationReason::NotSatisfied {
                        operator: constraint.operator.clone(),
                    },
                }),
                Err(OperatorError::Protocol(protocol)) => return Err(protocol.into()),
                Err(err) => violations.push(ConstraintViolation {
                    constraint_name: constraint.name.clone(),
                    reason: ViolationReason::Execution {
                        operator: constraint.operator.clone(),
                        detail: err.to_string(),
                    },
                }),
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            for violation in &violations {
                warn!(constraint = %violation.constraint_name, %location, "{}", violation.reason);
            }
            Err(EnforcementError::Violations(ConstraintViolations(
                violations,
            )))
        }
    }

    async fn apply_operator(
        &self,
        operator: OperatorId,
        input: &OperatorInput,
        scope: &OperatorScope,
    ) -> Result<bool, OperatorError> {
        match (operator, input) {
            (OperatorId::IsNotAssignedToAnyFormationOfType, OperatorInput::Membership(input)) => {
                self.apply_membership_exclusivity(input).await
            }
            (OperatorId::DoesNotContainResourceOfSubtype, OperatorInput::SubtypeExclusion(input)) => {
                self.apply_subtype_exclusion(input).await
            }
            (OperatorId::ContainsScenarioGroups, OperatorInput::ScenarioGroups(input)) => {
                self.apply_scenario_groups(input).await
            }
            (
                OperatorId::DoNotGenerateFormationAssignmentNotification,
                OperatorInput::Suppression(input),
            ) => self.apply_notification_suppression(input, false).await,
            (
                OperatorId::DoNotGenerateFormationAssignmentNotificationForLoops,
                OperatorInput::LoopSuppression(input),
            ) => self.apply_notification_suppression(input, true).await,
            (OperatorId::ConfigSchemaValidator, OperatorInput::SchemaValidator(input)) => {
                self.apply_schema_validation(input, scope).await
            }
            (OperatorId::ConfigMutator, OperatorInput::ConfigMutator(input)) => {
                self.apply_config_mutation(input, scope).await
            }
            (OperatorId::RedirectNotification, OperatorInput::Redirect(input)) => {
                self.apply_redirect(input, scope).await
            }
            (OperatorId::DestinationCreator, OperatorInput::Destination(input)) => {
                self.apply_destination_creator(input, scope).await
            }
            (OperatorId::AsynchronousFlowControl, OperatorInput::FlowControl(input)) => {
                self.apply_flow_control(input, scope).await
            }
            _ => Err(OperatorError::IncompatibleInput {
                operator: operator.as_str(),
            }),
        }
    }
}

/// Evaluation order: priority descending, ties broken by creation time
/// ascending so older constraints of equal priority run first.
fn order_for_evaluation(constraints: &mut [Constraint]) {
    constraints.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}
