//! Collaborator interfaces consumed by the constraint engine.
//!
//! Each trait covers one external concern: constraint lookup, tenant and
//! label resolution, assignment persistence, notification generation and
//! cleanup dispatch, destination/certificate management, and JSON-schema
//! validation. Implementations live outside this crate; tests use
//! in-memory fakes.

use async_trait::async_trait;
use formation_types::{
    Constraint, FormationAssignment, FormationOperation, JoinPointLocation, MatchingKey,
    ResourceType,
};
use serde::{Deserialize, Serialize};

/// Failure reported by a collaborator call.
///
/// Collaborators are opaque to the engine; their failures carry only a
/// human-readable message. The engine decides whether a failure is a
/// recorded policy-evaluation error or a fatal protocol error based on
/// where it occurred, not on its content.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A formation record as the engine needs to see it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formation {
    pub id: String,
    pub name: String,
    pub formation_template_id: String,
}

/// A used-or-unused one-time token together with its raw scenario group
/// entries. Entries may be plain strings (legacy encoding) or structured
/// objects carrying a `key` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneTimeToken {
    pub used: bool,
    pub scenario_groups: Vec<serde_json::Value>,
}

/// The notification pair generated for a cleanup hand-off: the assignment
/// in its post-transition state plus the reverse-direction assignment when
/// one exists.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentNotificationPair {
    pub assignment: FormationAssignment,
    pub reverse_assignment: Option<FormationAssignment>,
    pub operation: FormationOperation,
}

/// Certificate material issued for a destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateData {
    pub file_name: String,
    pub common_name: String,
    pub certificate_chain: String,
}

/// Lists constraints matching a formation-template scope and join point.
///
/// The store applies the scope rule (GLOBAL, or FORMATION_TYPE attached to
/// the given template) and exact equality on location and matching key.
#[async_trait]
pub trait ConstraintStore: Send + Sync {
    async fn list_matching_constraints(
        &self,
        formation_template_id: &str,
        location: JoinPointLocation,
        matching_key: &MatchingKey,
    ) -> Result<Vec<Constraint>, ServiceError>;
}

#[async_trait]
pub trait TenantResolver: Send + Sync {
    async fn internal_tenant_id(&self, external_tenant_id: &str) -> Result<String, ServiceError>;
}

/// Tenant-level automatic assignment lookup: which formations a tenant is
/// automatically (indirectly) a participant of.
#[async_trait]
pub trait AutoAssignmentLookup: Send + Sync {
    async fn formation_names_for_tenant(
        &self,
        tenant_internal_id: &str,
    ) -> Result<Vec<String>, ServiceError>;
}

#[async_trait]
pub trait FormationLookup: Send + Sync {
    async fn formations_by_names(
        &self,
        names: &[String],
        tenant_id: &str,
    ) -> Result<Vec<Formation>, ServiceError>;
}

#[async_trait]
pub trait FormationTemplateLookup: Send + Sync {
    async fn template_name(&self, formation_template_id: &str) -> Result<String, ServiceError>;
}

/// Label lookup for subtype classification and scenario membership.
#[async_trait]
pub trait LabelLookup: Send + Sync {
    /// Returns the label value, or `None` when the object has no label
    /// under the given key.
    async fn label_value(
        &self,
        tenant_id: &str,
        object_type: ResourceType,
        object_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, ServiceError>;
}

#[async_trait]
pub trait ApplicationLookup: Send + Sync {
    /// IDs of all applications currently participating in the named formation.
    async fn application_ids_in_formation(
        &self,
        tenant_id: &str,
        formation_name: &str,
    ) -> Result<Vec<String>, ServiceError>;
}

#[async_trait]
pub trait RuntimeContextLookup: Send + Sync {
    async fn runtime_id(
        &self,
        tenant_id: &str,
        runtime_context_id: &str,
    ) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait SystemAuthLookup: Send + Sync {
    async fn one_time_tokens_for_application(
        &self,
        application_id: &str,
    ) -> Result<Vec<OneTimeToken>, ServiceError>;
}

/// Persists formation assignment state transitions.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn update(&self, assignment: &FormationAssignment) -> Result<(), ServiceError>;
}

/// Generates assignment notification pairs and dispatches the cleanup
/// notification to the instance creator participant.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn generate_assignment_pair(
        &self,
        assignment: &FormationAssignment,
        reverse_assignment: Option<&FormationAssignment>,
        operation: FormationOperation,
    ) -> Result<AssignmentNotificationPair, ServiceError>;

    /// Synchronously dispatches the cleanup notification for the pair.
    /// Returns whether the assignment may already be deleted.
    async fn dispatch_cleanup(
        &self,
        pair: &AssignmentNotificationPair,
    ) -> Result<bool, ServiceError>;
}

/// Creates and deletes registered destinations on behalf of an assignment.
///
/// Creation must be idempotent from the operator's point of view: a
/// destination that already exists under the same name is replaced, not
/// reported as a conflict.
#[async_trait]
pub trait DestinationService: Send + Sync {
    async fn create_design_time_destinations(
        &self,
        destinations: &[crate::configuration::Destination],
        assignment: &FormationAssignment,
    ) -> Result<(), ServiceError>;

    async fn create_credential_destinations(
        &self,
        kind: crate::configuration::CredentialKind,
        destinations: &[crate::configuration::Destination],
        credentials: &serde_json::Value,
        assignment: &FormationAssignment,
        correlation_ids: &[String],
    ) -> Result<(), ServiceError>;

    async fn delete_destinations(
        &self,
        assignment: &FormationAssignment,
    ) -> Result<(), ServiceError>;
}

/// Issues and deletes destination certificates.
#[async_trait]
pub trait CertificateService: Send + Sync {
    async fn create_certificate(
        &self,
        destinations: &[crate::configuration::Destination],
        kind: crate::configuration::CredentialKind,
        assignment: &FormationAssignment,
    ) -> Result<CertificateData, ServiceError>;

    async fn delete_certificates(
        &self,
        assignment: &FormationAssignment,
    ) -> Result<(), ServiceError>;
}

/// Compiles a JSON schema and checks a document against it.
#[async_trait]
pub trait SchemaValidator: Send + Sync {
    /// `Ok(true)` when the document conforms, `Ok(false)` when it does
    /// not, `Err` when the schema itself cannot be compiled.
    async fn validate(
        &self,
        schema: &str,
        document: &serde_json::Value,
    ) -> Result<bool, ServiceError>;
}
