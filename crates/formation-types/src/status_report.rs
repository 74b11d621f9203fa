use crate::assignment::AssignmentState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The result of an asynchronous status callback from a notified
/// participant.
///
/// Shared-mutable during evaluation: operators may reclassify `state`
/// before the orchestrator persists it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationStatusReport {
    pub state: AssignmentState,
    pub configuration: Option<serde_json::Value>,
    pub error: Option<String>,
}

pub type SharedStatusReport = Arc<Mutex<NotificationStatusReport>>;

impl NotificationStatusReport {
    pub fn new(state: AssignmentState) -> Self {
        Self {
            state,
            configuration: None,
            error: None,
        }
    }

    pub fn with_configuration(state: AssignmentState, configuration: serde_json::Value) -> Self {
        Self {
            state,
            configuration: Some(configuration),
            error: None,
        }
    }

    pub fn shared(self) -> SharedStatusReport {
        Arc::new(Mutex::new(self))
    }

    /// Whether the callback carried a non-empty configuration blob.
    pub fn has_configuration(&self) -> bool {
        match &self.configuration {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Object(obj)) => !obj.is_empty(),
            Some(_) => true,
        }
    }
}
