//! Lenient document model for the assignment configuration blob.
//!
//! The blob is participant-authored JSON; unknown fields pass through
//! untouched and every section is optional. Operators only decode the
//! slices they act on and write enrichments back onto the raw
//! `serde_json::Value` so nothing a participant sent is lost.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The credential families a destination can be provisioned with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialKind {
    Basic,
    SamlAssertion,
    ClientCertificate,
    Oauth2ClientCredentials,
    Oauth2Mtls,
}

impl CredentialKind {
    /// The JSON key under `inboundCommunication` / `outboundCommunication`
    /// for this credential family.
    pub fn json_key(&self) -> &'static str {
        match self {
            Self::Basic => "basicAuthentication",
            Self::SamlAssertion => "samlAssertion",
            Self::ClientCertificate => "clientCertificateAuthentication",
            Self::Oauth2ClientCredentials => "oauth2ClientCredentials",
            Self::Oauth2Mtls => "oauth2mtls",
        }
    }

    /// Families whose destinations need certificate material issued before
    /// the counterpart can be notified.
    pub fn requires_certificate(&self) -> bool {
        matches!(
            self,
            Self::SamlAssertion | Self::ClientCertificate | Self::Oauth2Mtls
        )
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.json_key())
    }
}

/// A destination declaration inside a configuration blob.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subaccount_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub correlation_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<serde_json::Value>,
}

/// One credential family's inbound section: where destinations should be
/// created and, for certificate-based kinds, the issued certificate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundDetails {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destinations: Vec<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion_issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub correlation_ids: Vec<String>,
}

/// The `credentials.inboundCommunication` section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundCommunication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_authentication: Option<InboundDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saml_assertion: Option<InboundDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate_authentication: Option<InboundDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_client_credentials: Option<InboundDetails>,
    #[serde(default, rename = "oauth2mtls", skip_serializing_if = "Option::is_none")]
    pub oauth2_mtls: Option<InboundDetails>,
}

impl InboundCommunication {
    pub fn details(&self, kind: CredentialKind) -> Option<&InboundDetails> {
        match kind {
            CredentialKind::Basic => self.basic_authentication.as_ref(),
            CredentialKind::SamlAssertion => self.saml_assertion.as_ref(),
            CredentialKind::ClientCertificate => self.client_certificate_authentication.as_ref(),
            CredentialKind::Oauth2ClientCredentials => self.oauth2_client_credentials.as_ref(),
            CredentialKind::Oauth2Mtls => self.oauth2_mtls.as_ref(),
        }
    }
}

/// The `credentials.outboundCommunication` section, kept as raw values per
/// family: the engine forwards these to the destination service verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCommunication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_authentication: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saml_assertion: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate_authentication: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_client_credentials: Option<serde_json::Value>,
    #[serde(default, rename = "oauth2mtls", skip_serializing_if = "Option::is_none")]
    pub oauth2_mtls: Option<serde_json::Value>,
}

impl OutboundCommunication {
    pub fn credentials(&self, kind: CredentialKind) -> Option<&serde_json::Value> {
        match kind {
            CredentialKind::Basic => self.basic_authentication.as_ref(),
            CredentialKind::SamlAssertion => self.saml_assertion.as_ref(),
            CredentialKind::ClientCertificate => self.client_certificate_authentication.as_ref(),
            CredentialKind::Oauth2ClientCredentials => self.oauth2_client_credentials.as_ref(),
            CredentialKind::Oauth2Mtls => self.oauth2_mtls.as_ref(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_communication: Option<InboundCommunication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_communication: Option<OutboundCommunication>,
}

/// Top-level view of an assignment's configuration blob.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentConfiguration {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destinations: Vec<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

impl AssignmentConfiguration {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    pub fn inbound(&self) -> Option<&InboundCommunication> {
        self.credentials
            .as_ref()
            .and_then(|c| c.inbound_communication.as_ref())
    }

    pub fn outbound(&self) -> Option<&OutboundCommunication> {
        self.credentials
            .as_ref()
            .and_then(|c| c.outbound_communication.as_ref())
    }
}

/// Writes an issued certificate into
/// `credentials.inboundCommunication.<kind>.certificate` on the raw blob,
/// creating intermediate objects as needed. Everything else in the blob is
/// left as the participant sent it.
pub fn enrich_with_certificate(
    configuration: &mut serde_json::Value,
    kind: CredentialKind,
    certificate_chain: &str,
) {
    let mut cursor = configuration;
    for key in ["credentials", "inboundCommunication", kind.json_key()] {
        if !cursor.is_object() {
            *cursor = serde_json::Value::Object(serde_json::Map::new());
        }
        cursor = &mut cursor[key];
    }
    if !cursor.is_object() {
        *cursor = serde_json::Value::Object(serde_json::Map::new());
    }
    cursor["certificate"] = serde_json::Value::String(certificate_chain.into());
}
