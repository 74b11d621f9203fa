use crate::resource::ResourceType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a constraint is evaluated before or after its target operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    Pre,
    Post,
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pre => write!(f, "PRE"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Visibility of a constraint record.
///
/// `Global` constraints apply to every formation template; `FormationType`
/// constraints apply only when attached to a template via a reference record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintScope {
    Global,
    FormationType,
}

/// The lifecycle phase a constraint is bound to.
///
/// Together with [`ConstraintType`] this identifies a join point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetOperation {
    AssignFormation,
    UnassignFormation,
    CreateFormation,
    DeleteFormation,
    GenerateAssignmentNotification,
    SendNotification,
    NotificationStatusReturned,
}

impl TargetOperation {
    /// Returns the variant name as a static string for error messages and logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AssignFormation => "ASSIGN_FORMATION",
            Self::UnassignFormation => "UNASSIGN_FORMATION",
            Self::CreateFormation => "CREATE_FORMATION",
            Self::DeleteFormation => "DELETE_FORMATION",
            Self::GenerateAssignmentNotification => "GENERATE_ASSIGNMENT_NOTIFICATION",
            Self::SendNotification => "SEND_NOTIFICATION",
            Self::NotificationStatusReturned => "NOTIFICATION_STATUS_RETURNED",
        }
    }
}

impl fmt::Display for TargetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A stored, data-driven rule binding an operator to a join point and a
/// resource match filter.
///
/// Read-only from the engine's perspective; lifecycle management happens
/// through the administrative API. `input_template` is rendered against the
/// join point details to produce the operator's typed input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub name: String,
    pub constraint_type: ConstraintType,
    pub target_operation: TargetOperation,
    /// String key into the operator registry.
    pub operator: String,
    pub resource_type: ResourceType,
    pub resource_subtype: String,
    pub input_template: String,
    pub scope: ConstraintScope,
    /// Ordering hint: higher priority constraints are evaluated first.
    /// Evaluation never short-circuits on priority.
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}
