use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Delivery mode of an outbound notification endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookMode {
    Sync,
    AsyncCallback,
}

/// An outbound notification endpoint.
///
/// Mutable during evaluation so a redirect operator can retarget delivery
/// just before the notification is sent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub url: Option<String>,
    pub url_template: Option<String>,
    pub mode: WebhookMode,
}

pub type SharedWebhook = Arc<Mutex<Webhook>>;

impl Webhook {
    pub fn shared(self) -> SharedWebhook {
        Arc::new(Mutex::new(self))
    }
}
