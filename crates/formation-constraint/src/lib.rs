pub mod configuration;
pub mod details;
pub mod engine;
pub mod error;
pub mod inputs;
pub mod operators;
pub mod registry;
pub mod services;
pub mod template;

pub use details::{CallerKind, FormationView, JoinPointDetails};
pub use engine::{ConstraintEngine, EngineConfig, Services};
pub use error::{
    ConstraintViolation, ConstraintViolations, EnforcementError, OperatorError, ProtocolError,
    ViolationReason,
};
pub use registry::{OperatorId, validate_referenced_operators};
pub use services::ServiceError;

#[cfg(test)]
mod testsupport;
