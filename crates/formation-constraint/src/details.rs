//! Join-point payloads handed to the engine by the orchestrator.
//!
//! Each join point family carries its own detail struct; all of them can
//! answer two questions: which matching key selects constraints here, and
//! what template context do the operator input templates render against.
//!
//! Live state (assignments, status reports, webhooks) travels as shared
//! mutable handles so operators can transition it in place.

use formation_types::{
    FormationOperation, MatchingKey, ResourceType, SharedAssignment, SharedStatusReport,
    SharedWebhook,
};
use serde_json::{Value, json};

/// Who issued the callback a status-returned join point reacts to.
///
/// The instance creator's own callbacks must not re-trigger the cleanup
/// transition they are reporting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallerKind {
    Participant,
    InstanceCreator,
}

/// The formation a membership change targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormationView {
    pub id: String,
    pub name: String,
    pub formation_template_id: String,
}

/// Details for assign/unassign join points.
#[derive(Clone, Debug)]
pub struct MembershipChangeDetails {
    pub resource_type: ResourceType,
    pub resource_subtype: String,
    pub resource_id: String,
    pub tenant_id: String,
    pub formation: FormationView,
}

/// Details for formation create/delete join points.
#[derive(Clone, Debug)]
pub struct FormationLifecycleDetails {
    pub operation: FormationOperation,
    pub formation_template_name: String,
    pub formation_name: String,
    pub tenant_id: String,
}

/// Details for the generate-assignment-notification join point.
#[derive(Clone, Debug)]
pub struct GenerateNotificationDetails {
    pub operation: FormationOperation,
    pub resource_type: ResourceType,
    pub resource_subtype: String,
    pub resource_id: String,
    pub source_resource_type: ResourceType,
    pub source_resource_id: String,
    pub tenant_id: String,
    pub formation: FormationView,
}

/// Details for the send-notification join points.
#[derive(Clone, Debug)]
pub struct SendNotificationDetails {
    pub operation: FormationOperation,
    pub resource_type: ResourceType,
    pub resource_subtype: String,
    pub resource_id: String,
    pub tenant_id: String,
    pub formation: FormationView,
    pub should_redirect: bool,
    pub webhook: SharedWebhook,
    pub assignment: Option<SharedAssignment>,
    pub reverse_assignment: Option<SharedAssignment>,
}

/// Details for the notification-status-returned join points.
#[derive(Clone, Debug)]
pub struct StatusReturnedDetails {
    pub operation: FormationOperation,
    pub resource_type: ResourceType,
    pub resource_subtype: String,
    pub resource_id: String,
    pub tenant_id: String,
    pub formation: FormationView,
    pub caller: CallerKind,
    pub assignment: Option<SharedAssignment>,
    pub reverse_assignment: Option<SharedAssignment>,
    pub status_report: Option<SharedStatusReport>,
}

/// The payload variants, one per join point family.
#[derive(Clone, Debug)]
pub enum JoinPointDetails {
    Assign(MembershipChangeDetails),
    Unassign(MembershipChangeDetails),
    FormationLifecycle(FormationLifecycleDetails),
    GenerateNotification(GenerateNotificationDetails),
    SendNotification(SendNotificationDetails),
    StatusReturned(StatusReturnedDetails),
}

impl JoinPointDetails {
    /// The (resource type, resource subtype) pair constraints are matched
    /// against at this join point. Formation lifecycle join points match on
    /// the formation template itself.
    pub fn matching_key(&self) -> MatchingKey {
        match self {
            Self::Assign(d) | Self::Unassign(d) => {
                MatchingKey::new(d.resource_type, d.resource_subtype.clone())
            }
            Self::FormationLifecycle(d) => MatchingKey::new(
                ResourceType::FormationTemplate,
                d.formation_template_name.clone(),
            ),
            Self::GenerateNotification(d) => {
                MatchingKey::new(d.resource_type, d.resource_subtype.clone())
            }
            Self::SendNotification(d) => {
                MatchingKey::new(d.resource_type, d.resource_subtype.clone())
            }
            Self::StatusReturned(d) => {
                MatchingKey::new(d.resource_type, d.resource_subtype.clone())
            }
        }
    }

    /// Snapshots the details into the JSON context the input templates
    /// render against. Shared handles are locked briefly and copied; absent
    /// optional parts become `null` so templates can reference them without
    /// failing.
    pub async fn template_context(&self) -> Value {
        match self {
            Self::Assign(d) | Self::Unassign(d) => json!({
                "resource_type": d.resource_type,
                "resource_subtype": d.resource_subtype,
                "resource_id": d.resource_id,
                "tenant_id": d.tenant_id,
                "formation": {
                    "id": d.formation.id,
                    "name": d.formation.name,
                    "formation_template_id": d.formation.formation_template_id,
                },
            }),
            Self::FormationLifecycle(d) => json!({
                "operation": d.operation,
                "formation_template_name": d.formation_template_name,
                "formation_name": d.formation_name,
                "tenant_id": d.tenant_id,
            }),
            Self::GenerateNotification(d) => json!({
                "operation": d.operation,
                "resource_type": d.resource_type,
                "resource_subtype": d.resource_subtype,
                "resource_id": d.resource_id,
                "source_resource_type": d.source_resource_type,
                "source_resource_id": d.source_resource_id,
                "tenant_id": d.tenant_id,
                "formation": {
                    "id": d.formation.id,
                    "name": d.formation.name,
                    "formation_template_id": d.formation.formation_template_id,
                },
            }),
            Self::SendNotification(d) => {
                let webhook = d.webhook.lock().await.clone();
                let assignment = match &d.assignment {
                    Some(a) => serde_json::to_value(a.lock().await.clone())
                        .unwrap_or(Value::Null),
                    None => Value::Null,
                };
                let reverse = match &d.reverse_assignment {
                    Some(a) => serde_json::to_value(a.lock().await.clone())
                        .unwrap_or(Value::Null),
                    None => Value::Null,
                };
                json!({
                    "operation": d.operation,
                    "resource_type": d.resource_type,
                    "resource_subtype": d.resource_subtype,
                    "resource_id": d.resource_id,
                    "tenant_id": d.tenant_id,
                    "formation": {
                        "id": d.formation.id,
                        "name": d.formation.name,
                        "formation_template_id": d.formation.formation_template_id,
                    },
                    "should_redirect": d.should_redirect,
                    "webhook": webhook,
                    "assignment": assignment,
                    "reverse_assignment": reverse,
                })
            }
            Self::StatusReturned(d) => {
                let assignment = match &d.assignment {
                    Some(a) => serde_json::to_value(a.lock().await.clone())
                        .unwrap_or(Value::Null),
                    None => Value::Null,
                };
                let reverse = match &d.reverse_assignment {
                    Some(a) => serde_json::to_value(a.lock().await.clone())
                        .unwrap_or(Value::Null),
                    None => Value::Null,
                };
                let report = match &d.status_report {
                    Some(r) => serde_json::to_value(r.lock().await.clone())
                        .unwrap_or(Value::Null),
                    None => Value::Null,
                };
                json!({
                    "operation": d.operation,
                    "resource_type": d.resource_type,
                    "resource_subtype": d.resource_subtype,
                    "resource_id": d.resource_id,
                    "tenant_id": d.tenant_id,
                    "formation": {
                        "id": d.formation.id,
                        "name": d.formation.name,
                        "formation_template_id": d.formation.formation_template_id,
                    },
                    "assignment": assignment,
                    "reverse_assignment": reverse,
                    "status_report": report,
                })
            }
        }
    }
}
