//! `RedirectNotification`: retargets an outbound notification's webhook
//! just before delivery.

use crate::engine::ConstraintEngine;
use crate::error::OperatorError;
use crate::inputs::RedirectInput;
use crate::operators::OperatorScope;

impl ConstraintEngine {
    pub(crate) async fn apply_redirect(
        &self,
        input: &RedirectInput,
        scope: &OperatorScope,
    ) -> Result<bool, OperatorError> {
        if !input.should_redirect {
            return Ok(true);
        }
        // Redirecting with nothing to redirect to would silently deliver
        // to the original target.
        if input.url.is_none() && input.url_template.is_none() {
            return Err(OperatorError::MissingRedirectTarget);
        }
        let webhook = scope.require_webhook()?;
        let mut webhook = webhook.lock().await;
        if let Some(url) = &input.url {
            webhook.url = Some(url.clone());
        }
        if let Some(url_template) = &input.url_template {
            webhook.url_template = Some(url_template.clone());
        }
        Ok(true)
    }
}
