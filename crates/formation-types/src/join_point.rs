use crate::constraint::{ConstraintType, TargetOperation};
use crate::resource::ResourceType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies exactly where in the formation lifecycle constraint
/// evaluation occurs: the pair (target operation, pre/post).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinPointLocation {
    pub operation: TargetOperation,
    pub constraint_type: ConstraintType,
}

impl JoinPointLocation {
    pub const fn new(operation: TargetOperation, constraint_type: ConstraintType) -> Self {
        Self {
            operation,
            constraint_type,
        }
    }

    pub const fn pre_assign() -> Self {
        Self::new(TargetOperation::AssignFormation, ConstraintType::Pre)
    }

    pub const fn post_assign() -> Self {
        Self::new(TargetOperation::AssignFormation, ConstraintType::Post)
    }

    pub const fn pre_unassign() -> Self {
        Self::new(TargetOperation::UnassignFormation, ConstraintType::Pre)
    }

    pub const fn post_unassign() -> Self {
        Self::new(TargetOperation::UnassignFormation, ConstraintType::Post)
    }

    pub const fn pre_create() -> Self {
        Self::new(TargetOperation::CreateFormation, ConstraintType::Pre)
    }

    pub const fn pre_delete() -> Self {
        Self::new(TargetOperation::DeleteFormation, ConstraintType::Pre)
    }

    pub const fn pre_generate_assignment_notification() -> Self {
        Self::new(
            TargetOperation::GenerateAssignmentNotification,
            ConstraintType::Pre,
        )
    }

    pub const fn pre_send_notification() -> Self {
        Self::new(TargetOperation::SendNotification, ConstraintType::Pre)
    }

    pub const fn post_send_notification() -> Self {
        Self::new(TargetOperation::SendNotification, ConstraintType::Post)
    }

    pub const fn pre_notification_status_returned() -> Self {
        Self::new(
            TargetOperation::NotificationStatusReturned,
            ConstraintType::Pre,
        )
    }

    pub const fn post_notification_status_returned() -> Self {
        Self::new(
            TargetOperation::NotificationStatusReturned,
            ConstraintType::Post,
        )
    }
}

impl fmt::Display for JoinPointLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.constraint_type, self.operation)
    }
}

/// The reduced projection of join point details used to filter which
/// constraints apply, without inspecting the full context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingKey {
    pub resource_type: ResourceType,
    pub resource_subtype: String,
}

impl MatchingKey {
    pub fn new(resource_type: ResourceType, resource_subtype: impl Into<String>) -> Self {
        Self {
            resource_type,
            resource_subtype: resource_subtype.into(),
        }
    }
}
