//! Error taxonomy of the enforcement pipeline.
//!
//! Two tiers with different control flow:
//! - [`ConstraintViolation`]s are collected per constraint; every matching
//!   constraint is still evaluated and the batch is reported at the end.
//! - [`ProtocolError`]s abort the invocation immediately. They mean the
//!   asynchronous hand-off itself broke (a failed persist, a failed pair
//!   generation, a failed cleanup dispatch, a missing shared handle) and
//!   continuing would leave the assignment in an inconsistent state.

use std::fmt;

use formation_types::JoinPointLocation;

use crate::services::ServiceError;

/// Why a single constraint failed during enforcement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationReason {
    /// The constraint names an operator the registry does not know.
    OperatorNotRegistered { operator: String },
    /// Rendering or decoding the operator's input template failed.
    InputTemplate { operator: String, detail: String },
    /// The operator ran and hit an evaluation error.
    Execution { operator: String, detail: String },
    /// The operator ran to completion and judged the operation
    /// inadmissible.
    NotSatisfied { operator: String },
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OperatorNotRegistered { operator } => {
                write!(f, "operator {operator:?} is not registered")
            }
            Self::InputTemplate { operator, detail } => {
                write!(f, "input template for operator {operator:?}: {detail}")
            }
            Self::Execution { operator, detail } => {
                write!(f, "operator {operator:?} failed: {detail}")
            }
            Self::NotSatisfied { operator } => {
                write!(f, "operator {operator:?} is not satisfied")
            }
        }
    }
}

/// One failed constraint, by name, with the reason it failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub constraint_name: String,
    pub reason: ViolationReason,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constraint {:?}: {}", self.constraint_name, self.reason)
    }
}

/// The full batch of violations from one enforcement pass.
///
/// Never empty when surfaced; names every failing constraint so the caller
/// does not have to re-run enforcement to discover the next failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintViolations(pub Vec<ConstraintViolation>);

impl ConstraintViolations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConstraintViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} constraint(s) violated: ", self.0.len())?;
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConstraintViolations {}

/// A breakdown of the asynchronous notification protocol itself.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("join point details carry no formation assignment")]
    MissingAssignment,
    #[error("join point details carry no notification status report")]
    MissingStatusReport,
    #[error("join point details carry no webhook")]
    MissingWebhook,
    #[error("persisting assignment {assignment_id:?} failed: {source}")]
    PersistFailed {
        assignment_id: String,
        source: ServiceError,
    },
    #[error("generating notification pair for assignment {assignment_id:?} failed: {source}")]
    PairGenerationFailed {
        assignment_id: String,
        source: ServiceError,
    },
    #[error("dispatching cleanup notification for assignment {assignment_id:?} failed: {source}")]
    CleanupDispatchFailed {
        assignment_id: String,
        source: ServiceError,
    },
}

/// A single operator invocation's failure, before the engine classifies it.
///
/// `Protocol` variants propagate out of the enforcement loop untouched;
/// everything else is folded into a [`ConstraintViolation`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OperatorError {
    #[error("operator {operator:?} received an incompatible input")]
    IncompatibleInput { operator: &'static str },
    #[error("operator {operator:?} does not support resource type {resource_type:?}")]
    UnsupportedResourceType {
        operator: &'static str,
        resource_type: String,
    },
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("assignment {assignment_id:?} carries an invalid configuration: {detail}")]
    InvalidConfiguration {
        assignment_id: String,
        detail: String,
    },
    #[error("no JSON schema provided while a configuration is present")]
    EmptySchema,
    #[error("redirect requested without a target url or url template")]
    MissingRedirectTarget,
    #[error("operator {operator:?} is not applicable to operation {operation:?}")]
    InvalidOperation {
        operator: &'static str,
        operation: String,
    },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Top-level result of [`crate::engine::ConstraintEngine::enforce_constraints`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnforcementError {
    #[error("listing constraints for join point {location} failed: {source}")]
    Store {
        location: JoinPointLocation,
        source: ServiceError,
    },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Violations(ConstraintViolations),
}
