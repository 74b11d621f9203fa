pub mod assignment;
pub mod constraint;
pub mod join_point;
pub mod resource;
pub mod status_report;
pub mod webhook;

pub use assignment::{
    AssignmentState, FormationAssignment, FormationOperation, Participant, SharedAssignment,
};
pub use constraint::{Constraint, ConstraintScope, ConstraintType, TargetOperation};
pub use join_point::{JoinPointLocation, MatchingKey};
pub use resource::ResourceType;
pub use status_report::{NotificationStatusReport, SharedStatusReport};
pub use webhook::{SharedWebhook, Webhook, WebhookMode};
