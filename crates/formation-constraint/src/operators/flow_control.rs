//! `AsynchronousFlowControl`: drives the instance-creator hand-off of the
//! asynchronous unassign protocol, and the config-pending reclassification
//! of the assign protocol.
//!
//! Transitions are keyed on (join point, formation operation, assignment
//! state, reported state). Unrecognized combinations pass through
//! untouched; the operator never vetoes, it only transitions.
//!
//! The cleanup transition (`DELETING` + reported `READY`) holds the
//! assignment lock across persist, pair generation, and dispatch so a
//! concurrent redelivery of the same callback observes the post-transition
//! state and passes through instead of dispatching a second cleanup.

use formation_types::{AssignmentState, FormationOperation, TargetOperation};
use tracing::{debug, info};

use crate::details::CallerKind;
use crate::engine::ConstraintEngine;
use crate::error::{OperatorError, ProtocolError};
use crate::inputs::{FlowControlInput, RedirectInput};
use crate::operators::OperatorScope;
use crate::registry::OperatorId;

impl ConstraintEngine {
    pub(crate) async fn apply_flow_control(
        &self,
        input: &FlowControlInput,
        scope: &OperatorScope,
    ) -> Result<bool, OperatorError> {
        match scope.location.operation {
            TargetOperation::SendNotification => self.flow_control_pre_send(input, scope).await,
            TargetOperation::NotificationStatusReturned => {
                self.flow_control_status_returned(input, scope).await
            }
            other => Err(OperatorError::InvalidOperation {
                operator: OperatorId::AsynchronousFlowControl.as_str(),
                operation: other.to_string(),
            }),
        }
    }

    /// Before delivery: retarget the webhook at the instance creator when
    /// the protocol requires it.
    async fn flow_control_pre_send(
        &self,
        input: &FlowControlInput,
        scope: &OperatorScope,
    ) -> Result<bool, OperatorError> {
        let redirect = RedirectInput {
            should_redirect: input.should_redirect,
            url: input.url.clone(),
            url_template: input.url_template.clone(),
            operation: Some(input.operation),
        };
        match input.operation {
            FormationOperation::Assign => self.apply_redirect(&redirect, scope).await,
            FormationOperation::Unassign => {
                let state = {
                    let assignment = scope.require_assignment()?;
                    let assignment = assignment.lock().await;
                    assignment.state
                };
                if state.requires_instance_creator_delivery() {
                    let forced = RedirectInput {
                        should_redirect: true,
                        ..redirect
                    };
                    self.apply_redirect(&forced, scope).await
                } else {
                    Ok(true)
                }
            }
            other => Err(OperatorError::InvalidOperation {
                operator: OperatorId::AsynchronousFlowControl.as_str(),
                operation: other.to_string(),
            }),
        }
    }

    async fn flow_control_status_returned(
        &self,
        input: &FlowControlInput,
        scope: &OperatorScope,
    ) -> Result<bool, OperatorError> {
        match input.operation {
            FormationOperation::Assign => self.assign_status_returned(scope).await,
            FormationOperation::Unassign => self.unassign_status_returned(scope).await,
            other => Err(OperatorError::InvalidOperation {
                operator: OperatorId::AsynchronousFlowControl.as_str(),
                operation: other.to_string(),
            }),
        }
    }

    /// Assign callbacks: a READY report that still carries inbound
    /// credential requests is not done negotiating; reclassify it as
    /// CONFIG_PENDING.
    async fn assign_status_returned(&self, scope: &OperatorScope) -> Result<bool, OperatorError> {
        let assignment_id = {
            let assignment = scope.require_assignment()?;
            let assignment = assignment.lock().await;
            assignment.id.clone()
        };
        let report = scope.require_status_report()?;
        let mut report = report.lock().await;
        if report.state != AssignmentState::Ready || !report.has_configuration() {
            return Ok(true);
        }
        let configuration = report
            .configuration
            .clone()
            .unwrap_or(serde_json::Value::Null);
        let parsed = crate::configuration::AssignmentConfiguration::from_value(&configuration)
            .map_err(|err| OperatorError::InvalidConfiguration {
                assignment_id,
                detail: err.to_string(),
            })?;
        if parsed.inbound().is_some() {
            debug!("reported configuration still requests inbound credentials");
            report.state = AssignmentState::ConfigPending;
        }
        Ok(true)
    }

    /// Unassign callbacks: the two-phase deletion state machine.
    async fn unassign_status_returned(&self, scope: &OperatorScope) -> Result<bool, OperatorError> {
        let shared_assignment = scope.require_assignment()?;
        let mut assignment = shared_assignment.lock().await;
        let report = scope.require_status_report()?;
        let mut report = report.lock().await;

        // The instance creator reporting on its own cleanup must not
        // re-enter the transition it is reporting on.
        if scope.caller == CallerKind::InstanceCreator
            && assignment.state == AssignmentState::Deleting
        {
            return Ok(true);
        }

        match (assignment.state, report.state) {
            // The participant finished; hand the assignment to the
            // instance creator for resource cleanup.
            (AssignmentState::Deleting, AssignmentState::Ready) => {
                assignment.state = AssignmentState::InstanceCreatorDeleting;
                self.services
                    .assignments
                    .update(&assignment)
                    .await
                    .map_err(|source| ProtocolError::PersistFailed {
                        assignment_id: assignment.id.clone(),
                        source,
                    })?;
                report.state = AssignmentState::InstanceCreatorDeleting;

                let reverse = match &scope.reverse_assignment {
                    Some(shared) => Some(shared.lock().await.clone()),
                    None => None,
                };
                let pair = self
                    .services
                    .notifications
                    .generate_assignment_pair(
                        &assignment,
                        reverse.as_ref(),
                        FormationOperation::Unassign,
                    )
                    .await
                    .map_err(|source| ProtocolError::PairGenerationFailed {
                        assignment_id: assignment.id.clone(),
                        source,
                    })?;
                let already_deleted = self
                    .services
                    .notifications
                    .dispatch_cleanup(&pair)
                    .await
                    .map_err(|source| ProtocolError::CleanupDispatchFailed {
                        assignment_id: assignment.id.clone(),
                        source,
                    })?;
                info!(assignment_id = %assignment.id, "cleanup notification dispatched");
                // A synchronous cleanup finishes before any callback can
                // arrive; report READY so the caller deletes the
                // assignment instead of waiting forever.
                if already_deleted {
                    report.state = AssignmentState::Ready;
                }
                Ok(true)
            }
            // The instance creator finished; the orchestrator deletes the
            // assignment after this pass.
            (AssignmentState::InstanceCreatorDeleting, AssignmentState::Ready) => Ok(true),
            // The instance creator failed; reclassify the error so it is
            // attributed to the cleanup phase.
            (AssignmentState::InstanceCreatorDeleting, AssignmentState::DeleteError) => {
                report.state = AssignmentState::InstanceCreatorDeleteError;
                Ok(true)
            }
            // The participant failed; the report already says so.
            (AssignmentState::Deleting, AssignmentState::DeleteError) => Ok(true),
            _ => Ok(true),
        }
    }
}
