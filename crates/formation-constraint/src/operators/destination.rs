//! `DestinationCreator`: materializes the destinations a configuration
//! blob declares, and tears them down on unassign.
//!
//! Two moments matter during assign:
//! - after a status callback, design-time destinations are created and
//!   certificate material is issued for certificate-based inbound
//!   requests, enriching the configuration in place;
//! - before the next notification is sent, each inbound request on this
//!   side is paired with the counterpart's outbound credentials and the
//!   credential destinations are created.

use formation_types::{FormationOperation, TargetOperation};
use tracing::debug;

use crate::configuration::{AssignmentConfiguration, CredentialKind, enrich_with_certificate};
use crate::engine::ConstraintEngine;
use crate::error::OperatorError;
use crate::inputs::DestinationInput;
use crate::operators::OperatorScope;
use crate::registry::OperatorId;

const CERTIFICATE_KINDS: [CredentialKind; 3] = [
    CredentialKind::SamlAssertion,
    CredentialKind::ClientCertificate,
    CredentialKind::Oauth2Mtls,
];

const ALL_KINDS: [CredentialKind; 5] = [
    CredentialKind::Basic,
    CredentialKind::SamlAssertion,
    CredentialKind::ClientCertificate,
    CredentialKind::Oauth2ClientCredentials,
    CredentialKind::Oauth2Mtls,
];

impl ConstraintEngine {
    pub(crate) async fn apply_destination_creator(
        &self,
        input: &DestinationInput,
        scope: &OperatorScope,
    ) -> Result<bool, OperatorError> {
        match input.operation {
            FormationOperation::Unassign => self.tear_down_destinations(scope).await,
            FormationOperation::Assign => match scope.location.operation {
                TargetOperation::NotificationStatusReturned => {
                    self.create_design_time_and_certificates(scope).await
                }
                TargetOperation::SendNotification => self.create_credential_destinations(scope).await,
                other => Err(OperatorError::InvalidOperation {
                    operator: OperatorId::DestinationCreator.as_str(),
                    operation: other.to_string(),
                }),
            },
            other => Err(OperatorError::InvalidOperation {
                operator: OperatorId::DestinationCreator.as_str(),
                operation: other.to_string(),
            }),
        }
    }

    async fn tear_down_destinations(&self, scope: &OperatorScope) -> Result<bool, OperatorError> {
        let assignment = {
            let shared = scope.require_assignment()?;
            shared.lock().await.clone()
        };
        self.services.destinations.delete_destinations(&assignment).await?;
        self.services.certificates.delete_certificates(&assignment).await?;
        Ok(true)
    }

    async fn create_design_time_and_certificates(
        &self,
        scope: &OperatorScope,
    ) -> Result<bool, OperatorError> {
        let shared = scope.require_assignment()?;
        let mut assignment = shared.lock().await;
        let Some(raw) = assignment.value.clone() else {
            return Ok(true);
        };
        let config = AssignmentConfiguration::from_value(&raw).map_err(|err| {
            OperatorError::InvalidConfiguration {
                assignment_id: assignment.id.clone(),
                detail: err.to_string(),
            }
        })?;

        if !config.destinations.is_empty() {
            self.services
                .destinations
                .create_design_time_destinations(&config.destinations, &assignment)
                .await?;
        }

        let Some(inbound) = config.inbound() else {
            return Ok(true);
        };
        for kind in CERTIFICATE_KINDS {
            let Some(details) = inbound.details(kind) else {
                continue;
            };
            // An already-present certificate means a previous pass issued it.
            if details.certificate.is_some() || details.destinations.is_empty() {
                continue;
            }
            debug!(%kind, assignment_id = %assignment.id, "issuing destination certificate");
            let certificate = self
                .services
                .certificates
                .create_certificate(&details.destinations, kind, &assignment)
                .await?;
            let mut enriched = assignment.value.take().unwrap_or(serde_json::Value::Null);
            enrich_with_certificate(&mut enriched, kind, &certificate.certificate_chain);
            assignment.value = Some(enriched);
        }

        // Keep the outbound report consistent with the enriched value.
        if let Some(report) = &scope.status_report {
            let mut report = report.lock().await;
            if report.has_configuration() {
                report.configuration = assignment.value.clone();
            }
        }
        Ok(true)
    }

    /// Pairs each inbound credential request on this assignment with the
    /// counterpart's matching outbound credentials.
    async fn create_credential_destinations(
        &self,
        scope: &OperatorScope,
    ) -> Result<bool, OperatorError> {
        let assignment = {
            let shared = scope.require_assignment()?;
            shared.lock().await.clone()
        };
        let Some(raw) = &assignment.value else {
            return Ok(true);
        };
        let config = AssignmentConfiguration::from_value(raw).map_err(|err| {
            OperatorError::InvalidConfiguration {
                assignment_id: assignment.id.clone(),
                detail: err.to_string(),
            }
        })?;
        let Some(inbound) = config.inbound() else {
            return Ok(true);
        };

        let reverse_config = match &scope.reverse_assignment {
            Some(shared) => {
                let reverse = shared.lock().await;
                match &reverse.value {
                    Some(raw) => Some(AssignmentConfiguration::from_value(raw).map_err(|err| {
                        OperatorError::InvalidConfiguration {
                            assignment_id: reverse.id.clone(),
                            detail: err.to_string(),
                        }
                    })?),
                    None => None,
                }
            }
            None => None,
        };
        let Some(outbound) = reverse_config.as_ref().and_then(|c| c.outbound()) else {
            return Ok(true);
        };

        for kind in ALL_KINDS {
            let Some(details) = inbound.details(kind) else {
                continue;
            };
            if details.destinations.is_empty() {
                continue;
            }
            let Some(credentials) = outbound.credentials(kind) else {
                continue;
            };
            self.services
                .destinations
                .create_credential_destinations(
                    kind,
                    &details.destinations,
                    credentials,
                    &assignment,
                    &details.correlation_ids,
                )
                .await?;
        }
        Ok(true)
    }
}
