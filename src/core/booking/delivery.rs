use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::core::jobs::{BookingParams, PDF_PLACEHOLDER};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How a webhook response is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Success means the request went out; the reply is never read. This is
    /// what the legacy spreadsheet script endpoint supports.
    FireAndForget,
    /// Success needs a 2xx reply whose body does not report an error.
    #[default]
    ResponseChecked,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::FireAndForget => "fire_and_forget",
            DeliveryMode::ResponseChecked => "response_checked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid delivery mode '{0}' (expected fire_and_forget or response_checked)")]
pub struct DeliveryModeParseError(pub String);

impl FromStr for DeliveryMode {
    type Err = DeliveryModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fire_and_forget" => Ok(DeliveryMode::FireAndForget),
            "response_checked" => Ok(DeliveryMode::ResponseChecked),
            _ => Err(DeliveryModeParseError(s.to_string())),
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("could not reach webhook: {0}")]
    Transport(String),
    #[error("webhook rejected the booking: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub pdf_url: String,
}

impl DeliveryReceipt {
    pub fn placeholder() -> Self {
        Self {
            pdf_url: PDF_PLACEHOLDER.to_string(),
        }
    }
}

#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn deliver(
        &self,
        endpoint: &str,
        params: &BookingParams,
        mode: DeliveryMode,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn deliver(
        &self,
        endpoint: &str,
        params: &BookingParams,
        mode: DeliveryMode,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let body =
            serde_json::to_string(params).map_err(|e| DeliveryError::Transport(e.to_string()))?;

        // A plain-text body keeps the request "simple" for script endpoints
        // that cannot answer a JSON preflight.
        let content_type = match mode {
            DeliveryMode::FireAndForget => "text/plain;charset=utf-8",
            DeliveryMode::ResponseChecked => "application/json",
        };

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("Webhook answered HTTP {} ({} mode)", status.as_u16(), mode);

        if mode == DeliveryMode::FireAndForget {
            return Ok(DeliveryReceipt::placeholder());
        }

        if !status.is_success() {
            return Err(DeliveryError::Rejected(format!("HTTP {}", status.as_u16())));
        }
        let text = response
            .text()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        interpret_reply(&text)
    }
}

/// Read the script's `{status, pdf}` reply. Non-JSON bodies count as success.
fn interpret_reply(body: &str) -> Result<DeliveryReceipt, DeliveryError> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(DeliveryReceipt::placeholder());
    };

    if value.get("status").and_then(|v| v.as_str()) == Some("error") {
        let message = value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|v| v.as_str())
            .unwrap_or("endpoint reported an error");
        return Err(DeliveryError::Rejected(message.to_string()));
    }

    let pdf_url = value
        .get("pdfUrl")
        .or_else(|| value.get("pdf"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    Ok(match pdf_url {
        Some(pdf_url) => DeliveryReceipt { pdf_url },
        None => DeliveryReceipt::placeholder(),
    })
}
