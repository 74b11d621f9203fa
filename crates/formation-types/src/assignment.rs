use crate::resource::ResourceType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The operation in flight when a join point is reached.
///
/// Distinct from [`crate::TargetOperation`]: a notification-related join
/// point still carries the formation operation that triggered it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormationOperation {
    Assign,
    Unassign,
    Create,
    Delete,
}

impl fmt::Display for FormationOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assign => write!(f, "assign"),
            Self::Unassign => write!(f, "unassign"),
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Negotiation state of a formation assignment.
///
/// Transitions are scoped by the active operation:
/// - Assign: `Initial -> Ready -> ConfigPending` (plus `CreateError`).
/// - Unassign: `Deleting -> {DeleteError | InstanceCreatorDeleting}
///   -> {InstanceCreatorDeleteError | (deleted)}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentState {
    Initial,
    Ready,
    ConfigPending,
    CreateError,
    Deleting,
    DeleteError,
    InstanceCreatorDeleting,
    InstanceCreatorDeleteError,
}

impl AssignmentState {
    /// Returns the wire value as a static string for error messages and logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Ready => "READY",
            Self::ConfigPending => "CONFIG_PENDING",
            Self::CreateError => "CREATE_ERROR",
            Self::Deleting => "DELETING",
            Self::DeleteError => "DELETE_ERROR",
            Self::InstanceCreatorDeleting => "INSTANCE_CREATOR_DELETING",
            Self::InstanceCreatorDeleteError => "INSTANCE_CREATOR_DELETE_ERROR",
        }
    }

    /// Whether delivery of an unassign notification must be redirected to
    /// the instance creator participant instead of the primary target.
    pub fn requires_instance_creator_delivery(&self) -> bool {
        matches!(
            self,
            Self::InstanceCreatorDeleting | Self::InstanceCreatorDeleteError
        )
    }
}

impl fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One side of a bilateral assignment: the participant kind plus its ID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub kind: ResourceType,
    pub id: String,
}

impl Participant {
    pub fn new(kind: ResourceType, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// The bilateral (source -> target) relationship record within one
/// formation, carrying its negotiation state and the configuration blob
/// produced by the target's webhook response.
///
/// `value` is only ever replaced wholesale, never partially merged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormationAssignment {
    pub id: String,
    pub formation_id: String,
    pub tenant_id: String,
    pub source: Participant,
    pub target: Participant,
    pub state: AssignmentState,
    pub value: Option<serde_json::Value>,
}

/// Live, shared, mutable handle to an assignment during evaluation.
///
/// The caller hands the engine this handle rather than data it owns
/// exclusively; operators mutate the record in place as their primary side
/// effect. The mutex also serializes the read-modify-persist sequence of
/// the unassign cleanup transition against concurrent callback retries.
pub type SharedAssignment = Arc<Mutex<FormationAssignment>>;

impl FormationAssignment {
    pub fn shared(self) -> SharedAssignment {
        Arc::new(Mutex::new(self))
    }

    /// Whether the assignment carries a non-empty configuration.
    ///
    /// `null` and `{}` both count as empty: participants report `{}` while
    /// negotiation is still pending.
    pub fn has_configuration(&self) -> bool {
        match &self.value {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Object(obj)) => !obj.is_empty(),
            Some(_) => true,
        }
    }
}
