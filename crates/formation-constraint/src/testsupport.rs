//! In-memory fakes for the collaborator traits, plus fixture constructors
//! shared by the engine and operator tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use formation_types::{
    AssignmentState, Constraint, ConstraintScope, ConstraintType, FormationAssignment,
    FormationOperation, JoinPointLocation, MatchingKey, Participant, ResourceType, TargetOperation,
};

use crate::configuration::{CredentialKind, Destination};
use crate::details::FormationView;
use crate::engine::{ConstraintEngine, EngineConfig, Services};
use crate::services::{
    ApplicationLookup, AssignmentNotificationPair, AssignmentRepository, AutoAssignmentLookup,
    CertificateData, CertificateService, ConstraintStore, DestinationService, Formation,
    FormationLookup, FormationTemplateLookup, LabelLookup, NotificationService, OneTimeToken,
    RuntimeContextLookup, SchemaValidator, ServiceError, SystemAuthLookup, TenantResolver,
};

#[derive(Default)]
pub struct FakeConstraintStore {
    pub constraints: Mutex<Vec<Constraint>>,
    pub fail: Mutex<Option<ServiceError>>,
    pub queries: Mutex<Vec<(String, JoinPointLocation, MatchingKey)>>,
}

#[async_trait]
impl ConstraintStore for FakeConstraintStore {
    async fn list_matching_constraints(
        &self,
        formation_template_id: &str,
        location: JoinPointLocation,
        matching_key: &MatchingKey,
    ) -> Result<Vec<Constraint>, ServiceError> {
        self.queries.lock().unwrap().push((
            formation_template_id.to_owned(),
            location,
            matching_key.clone(),
        ));
        if let Some(err) = self.fail.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.constraints.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeTenantResolver {
    pub internal_id: Mutex<String>,
}

#[async_trait]
impl TenantResolver for FakeTenantResolver {
    async fn internal_tenant_id(&self, _external: &str) -> Result<String, ServiceError> {
        Ok(self.internal_id.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeAutoAssignments {
    pub names: Mutex<Vec<String>>,
}

#[async_trait]
impl AutoAssignmentLookup for FakeAutoAssignments {
    async fn formation_names_for_tenant(&self, _tenant: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self.names.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeFormations {
    pub formations: Mutex<Vec<Formation>>,
}

#[async_trait]
impl FormationLookup for FakeFormations {
    async fn formations_by_names(
        &self,
        names: &[String],
        _tenant: &str,
    ) -> Result<Vec<Formation>, ServiceError> {
        Ok(self
            .formations
            .lock()
            .unwrap()
            .iter()
            .filter(|f| names.contains(&f.name))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct FakeTemplates {
    pub names: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl FormationTemplateLookup for FakeTemplates {
    async fn template_name(&self, id: &str) -> Result<String, ServiceError> {
        self.names
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::new(format!("formation template {id:?} not found")))
    }
}

/// Labels keyed by (object_id, label_key).
#[derive(Default)]
pub struct FakeLabels {
    pub labels: Mutex<HashMap<(String, String), serde_json::Value>>,
}

impl FakeLabels {
    pub fn set(&self, object_id: &str, key: &str, value: serde_json::Value) {
        self.labels
            .lock()
            .unwrap()
            .insert((object_id.to_owned(), key.to_owned()), value);
    }
}

#[async_trait]
impl LabelLookup for FakeLabels {
    async fn label_value(
        &self,
        _tenant: &str,
        _object_type: ResourceType,
        object_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, ServiceError> {
        Ok(self
            .labels
            .lock()
            .unwrap()
            .get(&(object_id.to_owned(), key.to_owned()))
            .cloned())
    }
}

#[derive(Default)]
pub struct FakeApplications {
    pub member_ids: Mutex<Vec<String>>,
}

#[async_trait]
impl ApplicationLookup for FakeApplications {
    async fn application_ids_in_formation(
        &self,
        _tenant: &str,
        _formation: &str,
    ) -> Result<Vec<String>, ServiceError> {
        Ok(self.member_ids.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeRuntimeContexts {
    pub runtime_ids: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl RuntimeContextLookup for FakeRuntimeContexts {
    async fn runtime_id(&self, _tenant: &str, context_id: &str) -> Result<String, ServiceError> {
        self.runtime_ids
            .lock()
            .unwrap()
            .get(context_id)
            .cloned()
            .ok_or_else(|| ServiceError::new(format!("runtime context {context_id:?} not found")))
    }
}

#[derive(Default)]
pub struct FakeSystemAuths {
    pub tokens: Mutex<Vec<OneTimeToken>>,
}

#[async_trait]
impl SystemAuthLookup for FakeSystemAuths {
    async fn one_time_tokens_for_application(
        &self,
        _application_id: &str,
    ) -> Result<Vec<OneTimeToken>, ServiceError> {
        Ok(self.tokens.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeAssignmentRepo {
    pub updates: Mutex<Vec<FormationAssignment>>,
    pub fail: Mutex<Option<ServiceError>>,
}

#[async_trait]
impl AssignmentRepository for FakeAssignmentRepo {
    async fn update(&self, assignment: &FormationAssignment) -> Result<(), ServiceError> {
        if let Some(err) = self.fail.lock().unwrap().clone() {
            return Err(err);
        }
        self.updates.lock().unwrap().push(assignment.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNotifications {
    pub dispatch_count: AtomicUsize,
    pub fail_pair: Mutex<Option<ServiceError>>,
    pub fail_dispatch: Mutex<Option<ServiceError>>,
    pub dispatched_pairs: Mutex<Vec<AssignmentNotificationPair>>,
    /// What `dispatch_cleanup` reports back: whether the assignment was
    /// already cleaned up synchronously.
    pub dispatch_reports_deleted: Mutex<bool>,
}

#[async_trait]
impl NotificationService for FakeNotifications {
    async fn generate_assignment_pair(
        &self,
        assignment: &FormationAssignment,
        reverse: Option<&FormationAssignment>,
        operation: FormationOperation,
    ) -> Result<AssignmentNotificationPair, ServiceError> {
        if let Some(err) = self.fail_pair.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(AssignmentNotificationPair {
            assignment: assignment.clone(),
            reverse_assignment: reverse.cloned(),
            operation,
        })
    }

    async fn dispatch_cleanup(
        &self,
        pair: &AssignmentNotificationPair,
    ) -> Result<bool, ServiceError> {
        if let Some(err) = self.fail_dispatch.lock().unwrap().clone() {
            return Err(err);
        }
        self.dispatch_count.fetch_add(1, Ordering::SeqCst);
        self.dispatched_pairs.lock().unwrap().push(pair.clone());
        Ok(*self.dispatch_reports_deleted.lock().unwrap())
    }
}

#[derive(Default)]
pub struct FakeDestinations {
    pub design_time_calls: AtomicUsize,
    pub credential_calls: Mutex<Vec<CredentialKind>>,
    pub delete_calls: AtomicUsize,
}

#[async_trait]
impl DestinationService for FakeDestinations {
    async fn create_design_time_destinations(
        &self,
        _destinations: &[Destination],
        _assignment: &FormationAssignment,
    ) -> Result<(), ServiceError> {
        self.design_time_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_credential_destinations(
        &self,
        kind: CredentialKind,
        _destinations: &[Destination],
        _credentials: &serde_json::Value,
        _assignment: &FormationAssignment,
        _correlation_ids: &[String],
    ) -> Result<(), ServiceError> {
        self.credential_calls.lock().unwrap().push(kind);
        Ok(())
    }

    async fn delete_destinations(
        &self,
        _assignment: &FormationAssignment,
    ) -> Result<(), ServiceError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeCertificates {
    pub chain: Mutex<String>,
    pub issued: Mutex<Vec<CredentialKind>>,
    pub delete_calls: AtomicUsize,
}

impl Default for FakeCertificates {
    fn default() -> Self {
        Self {
            chain: Mutex::new("-----BEGIN CERTIFICATE-----".into()),
            issued: Mutex::new(Vec::new()),
            delete_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CertificateService for FakeCertificates {
    async fn create_certificate(
        &self,
        _destinations: &[Destination],
        kind: CredentialKind,
        assignment: &FormationAssignment,
    ) -> Result<CertificateData, ServiceError> {
        self.issued.lock().unwrap().push(kind);
        Ok(CertificateData {
            file_name: format!("{}.pem", assignment.id),
            common_name: assignment.id.clone(),
            certificate_chain: self.chain.lock().unwrap().clone(),
        })
    }

    async fn delete_certificates(
        &self,
        _assignment: &FormationAssignment,
    ) -> Result<(), ServiceError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeSchemaValidator {
    pub verdict: Mutex<bool>,
    pub fail: Mutex<Option<ServiceError>>,
    pub calls: AtomicUsize,
}

impl Default for FakeSchemaValidator {
    fn default() -> Self {
        Self {
            verdict: Mutex::new(true),
            fail: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SchemaValidator for FakeSchemaValidator {
    async fn validate(
        &self,
        _schema: &str,
        _document: &serde_json::Value,
    ) -> Result<bool, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(*self.verdict.lock().unwrap())
    }
}

/// Concrete handles to every fake, for assertions after a run.
pub struct Fakes {
    pub store: Arc<FakeConstraintStore>,
    pub tenants: Arc<FakeTenantResolver>,
    pub auto_assignments: Arc<FakeAutoAssignments>,
    pub formations: Arc<FakeFormations>,
    pub templates: Arc<FakeTemplates>,
    pub labels: Arc<FakeLabels>,
    pub applications: Arc<FakeApplications>,
    pub runtime_contexts: Arc<FakeRuntimeContexts>,
    pub system_auths: Arc<FakeSystemAuths>,
    pub assignments: Arc<FakeAssignmentRepo>,
    pub notifications: Arc<FakeNotifications>,
    pub destinations: Arc<FakeDestinations>,
    pub certificates: Arc<FakeCertificates>,
    pub schema_validator: Arc<FakeSchemaValidator>,
}

pub fn fix_engine() -> (ConstraintEngine, Fakes) {
    let fakes = Fakes {
        store: Arc::new(FakeConstraintStore::default()),
        tenants: Arc::new(FakeTenantResolver::default()),
        auto_assignments: Arc::new(FakeAutoAssignments::default()),
        formations: Arc::new(FakeFormations::default()),
        templates: Arc::new(FakeTemplates::default()),
        labels: Arc::new(FakeLabels::default()),
        applications: Arc::new(FakeApplications::default()),
        runtime_contexts: Arc::new(FakeRuntimeContexts::default()),
        system_auths: Arc::new(FakeSystemAuths::default()),
        assignments: Arc::new(FakeAssignmentRepo::default()),
        notifications: Arc::new(FakeNotifications::default()),
        destinations: Arc::new(FakeDestinations::default()),
        certificates: Arc::new(FakeCertificates::default()),
        schema_validator: Arc::new(FakeSchemaValidator::default()),
    };
    let services = Services {
        constraint_store: fakes.store.clone(),
        tenant_resolver: fakes.tenants.clone(),
        auto_assignments: fakes.auto_assignments.clone(),
        formations: fakes.formations.clone(),
        formation_templates: fakes.templates.clone(),
        labels: fakes.labels.clone(),
        applications: fakes.applications.clone(),
        runtime_contexts: fakes.runtime_contexts.clone(),
        system_auths: fakes.system_auths.clone(),
        assignments: fakes.assignments.clone(),
        notifications: fakes.notifications.clone(),
        destinations: fakes.destinations.clone(),
        certificates: fakes.certificates.clone(),
        schema_validator: fakes.schema_validator.clone(),
    };
    (ConstraintEngine::new(EngineConfig::default(), services), fakes)
}

pub fn fix_constraint(name: &str, operator: &str, input_template: &str) -> Constraint {
    Constraint {
        id: format!("c-{name}"),
        name: name.into(),
        constraint_type: ConstraintType::Pre,
        target_operation: TargetOperation::AssignFormation,
        operator: operator.into(),
        resource_type: ResourceType::Application,
        resource_subtype: "crm".into(),
        input_template: input_template.into(),
        scope: ConstraintScope::Global,
        priority: 0,
        created_at: Utc.timestamp_opt(1_700_000_000, 0).single().unwrap(),
    }
}

pub fn fix_assignment(state: AssignmentState) -> FormationAssignment {
    FormationAssignment {
        id: "fa-1".into(),
        formation_id: "f-1".into(),
        tenant_id: "t-1".into(),
        source: Participant::new(ResourceType::Application, "app-src"),
        target: Participant::new(ResourceType::Application, "app-tgt"),
        state,
        value: None,
    }
}

pub fn fix_formation_view() -> FormationView {
    FormationView {
        id: "f-1".into(),
        name: "prod-mesh".into(),
        formation_template_id: "ft-1".into(),
    }
}
