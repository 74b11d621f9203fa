//! Operator implementations.
//!
//! Each submodule extends [`crate::engine::ConstraintEngine`] with the
//! evaluation methods of one operator family. An operator returns
//! `Ok(true)` when the guarded operation may proceed, `Ok(false)` when it
//! is inadmissible, and `Err` when evaluation itself failed.

pub mod config_mutator;
pub mod destination;
pub mod flow_control;
pub mod membership;
pub mod redirect;
pub mod scenario_groups;
pub mod schema;
pub mod subtype;
pub mod suppression;

use formation_types::{
    JoinPointLocation, SharedAssignment, SharedStatusReport, SharedWebhook,
};

use crate::details::{CallerKind, JoinPointDetails};
use crate::error::ProtocolError;

/// The live state an operator may act on at the current join point.
///
/// Handles are cloned out of the join point details; an operator that
/// needs a handle the details did not carry reports a protocol error, not
/// a policy violation.
#[derive(Clone, Debug)]
pub struct OperatorScope {
    pub location: JoinPointLocation,
    pub caller: CallerKind,
    pub assignment: Option<SharedAssignment>,
    pub reverse_assignment: Option<SharedAssignment>,
    pub status_report: Option<SharedStatusReport>,
    pub webhook: Option<SharedWebhook>,
}

impl OperatorScope {
    pub fn from_details(location: JoinPointLocation, details: &JoinPointDetails) -> Self {
        let mut scope = Self {
            location,
            caller: CallerKind::Participant,
            assignment: None,
            reverse_assignment: None,
            status_report: None,
            webhook: None,
        };
        match details {
            JoinPointDetails::SendNotification(d) => {
                scope.assignment = d.assignment.clone();
                scope.reverse_assignment = d.reverse_assignment.clone();
                scope.webhook = Some(d.webhook.clone());
            }
            JoinPointDetails::StatusReturned(d) => {
                scope.caller = d.caller;
                scope.assignment = d.assignment.clone();
                scope.reverse_assignment = d.reverse_assignment.clone();
                scope.status_report = d.status_report.clone();
            }
            JoinPointDetails::Assign(_)
            | JoinPointDetails::Unassign(_)
            | JoinPointDetails::FormationLifecycle(_)
            | JoinPointDetails::GenerateNotification(_) => {}
        }
        scope
    }

    pub fn require_assignment(&self) -> Result<&SharedAssignment, ProtocolError> {
        self.assignment.as_ref().ok_or(ProtocolError::MissingAssignment)
    }

    pub fn require_status_report(&self) -> Result<&SharedStatusReport, ProtocolError> {
        self.status_report
            .as_ref()
            .ok_or(ProtocolError::MissingStatusReport)
    }

    pub fn require_webhook(&self) -> Result<&SharedWebhook, ProtocolError> {
        self.webhook.as_ref().ok_or(ProtocolError::MissingWebhook)
    }
}
