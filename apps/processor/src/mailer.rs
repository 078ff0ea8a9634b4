//! Email dispatchers used by the jobs.
//!
//! [`HttpEmailDispatcher`] posts each message to a transactional email API as
//! JSON with a bearer token. [`LogOnlyDispatcher`] is the fallback when no API
//! is configured and only records what would have been sent.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use fintrack_core::notifications::{DispatchError, EmailDispatcherTrait, EmailMessage};

use crate::config::EmailConfig;

/// Longest response body kept in a rejection error.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    template_id: &'a str,
    template_data: &'a Value,
}

pub struct HttpEmailDispatcher {
    client: reqwest::Client,
    endpoint: String,
    from: String,
    auth_header: HeaderValue,
    timeout: Duration,
}

impl HttpEmailDispatcher {
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let mut auth_header = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| anyhow::anyhow!("Invalid email API key format: {}", e))?;
        auth_header.set_sensitive(true);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: format!("{}/send", config.api_url),
            from: config.from.clone(),
            auth_header,
            timeout: config.timeout,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers
    }

    fn map_transport_error(&self, err: reqwest::Error) -> DispatchError {
        if err.is_timeout() {
            DispatchError::Timeout(self.timeout.as_secs())
        } else {
            DispatchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl EmailDispatcherTrait for HttpEmailDispatcher {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        if message.to.trim().is_empty() {
            return Err(DispatchError::InvalidMessage(
                "recipient address is empty".to_string(),
            ));
        }

        let body = SendRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            template_id: &message.template_id,
            template_data: &message.template_data,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        debug!(
            "Email '{}' accepted for {} ({})",
            message.template_id, message.to, status
        );
        Ok(())
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Default)]
pub struct LogOnlyDispatcher;

#[async_trait]
impl EmailDispatcherTrait for LogOnlyDispatcher {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        info!(
            to = %message.to,
            template = %message.template_id,
            "Email delivery disabled, would send '{}'",
            message.subject
        );
        Ok(())
    }
}
