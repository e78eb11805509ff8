//! Webhook Executor — forwards validated payloads to the automation backend

use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::error::WebhookError;
use crate::registry::WebhookDefinition;
use crate::validator::Validator;

/// Outbound webhook client
pub struct Executor {
    client: reqwest::Client,
    validator: Validator,
    default_timeout: Duration,
}

impl Executor {
    pub fn new(validator: Validator, default_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("toolhub-gateway/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            validator,
            default_timeout,
        }
    }

    /// Timeout applied to calls of `definition`
    pub fn timeout_for(&self, definition: &WebhookDefinition) -> Duration {
        definition.timeout.unwrap_or(self.default_timeout)
    }

    /// Validate `payload`, POST it to the webhook's external URL and return
    /// the parsed JSON response unchanged.
    pub async fn execute(
        &self,
        definition: &WebhookDefinition,
        payload: &Value,
    ) -> Result<Value, WebhookError> {
        let report = self.validator.validate(definition, payload);
        if !report.valid {
            return Err(WebhookError::Validation(report.errors));
        }

        let timeout = self.timeout_for(definition);
        let mut request = self
            .client
            .post(&definition.external_url)
            .timeout(timeout)
            .header("content-type", "application/json")
            .json(payload);
        for (name, value) in &definition.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let start = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| WebhookError::from_transport(e, timeout))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "Webhook {} failed: HTTP {} after {}ms",
                definition.name,
                status.as_u16(),
                start.elapsed().as_millis()
            );
            return Err(WebhookError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WebhookError::from_transport(e, timeout))?;
        let data: Value = serde_json::from_slice(&bytes)
            .map_err(|e| WebhookError::InvalidResponse(e.to_string()))?;

        info!(
            "Webhook {} completed: HTTP {}, {} bytes, {}ms",
            definition.name,
            status.as_u16(),
            bytes.len(),
            start.elapsed().as_millis()
        );

        Ok(data)
    }
}
