use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of resource a constraint targets or a participant embodies.
///
/// Matching against constraints is exact equality on (type, subtype);
/// there is no wildcard subtype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Application,
    Runtime,
    RuntimeContext,
    Tenant,
    FormationTemplate,
}

impl ResourceType {
    /// Returns the wire name as a static string for error messages and logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Application => "APPLICATION",
            Self::Runtime => "RUNTIME",
            Self::RuntimeContext => "RUNTIME_CONTEXT",
            Self::Tenant => "TENANT",
            Self::FormationTemplate => "FORMATION_TEMPLATE",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
