//! The closed operator registry.
//!
//! Constraints reference operators by string name; the registry is the
//! single source of truth mapping those names to the engine's built-in
//! implementations. There is no runtime registration: the set is a closed
//! enum, and [`validate_referenced_operators`] lets deployments fail fast
//! at startup when a stored constraint names an operator this build does
//! not carry.

use std::fmt;

use formation_types::Constraint;

/// Every operator the engine implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorId {
    IsNotAssignedToAnyFormationOfType,
    DoesNotContainResourceOfSubtype,
    ContainsScenarioGroups,
    DoNotGenerateFormationAssignmentNotification,
    DoNotGenerateFormationAssignmentNotificationForLoops,
    ConfigSchemaValidator,
    ConfigMutator,
    RedirectNotification,
    DestinationCreator,
    AsynchronousFlowControl,
}

impl OperatorId {
    pub const ALL: [OperatorId; 10] = [
        Self::IsNotAssignedToAnyFormationOfType,
        Self::DoesNotContainResourceOfSubtype,
        Self::ContainsScenarioGroups,
        Self::DoNotGenerateFormationAssignmentNotification,
        Self::DoNotGenerateFormationAssignmentNotificationForLoops,
        Self::ConfigSchemaValidator,
        Self::ConfigMutator,
        Self::RedirectNotification,
        Self::DestinationCreator,
        Self::AsynchronousFlowControl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsNotAssignedToAnyFormationOfType => "IsNotAssignedToAnyFormationOfType",
            Self::DoesNotContainResourceOfSubtype => "DoesNotContainResourceOfSubtype",
            Self::ContainsScenarioGroups => "ContainsScenarioGroups",
            Self::DoNotGenerateFormationAssignmentNotification => {
                "DoNotGenerateFormationAssignmentNotification"
            }
            Self::DoNotGenerateFormationAssignmentNotificationForLoops => {
                "DoNotGenerateFormationAssignmentNotificationForLoops"
            }
            Self::ConfigSchemaValidator => "ConfigSchemaValidator",
            Self::ConfigMutator => "ConfigMutator",
            Self::RedirectNotification => "RedirectNotification",
            Self::DestinationCreator => "DestinationCreator",
            Self::AsynchronousFlowControl => "AsynchronousFlowControl",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.as_str() == name)
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored constraint referencing an operator this build does not carry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("constraint {constraint_name:?} references unknown operator {operator:?}")]
pub struct UnknownOperator {
    pub constraint_name: String,
    pub operator: String,
}

/// Checks every constraint's operator reference against the registry.
/// Intended for startup, over the full stored constraint set.
pub fn validate_referenced_operators(
    constraints: &[Constraint],
) -> Result<(), Vec<UnknownOperator>> {
    let unknown: Vec<UnknownOperator> = constraints
        .iter()
        .filter(|c| OperatorId::parse(&c.operator).is_none())
        .map(|c| UnknownOperator {
            constraint_name: c.name.clone(),
            operator: c.operator.clone(),
        })
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(unknown)
    }
}
