//! HTTP renderer: posts the record as JSON to a render service.
//!
//! Request body: the record's fields (`{"name": ..., "core_action": ...}`).
//! Expected response: `{"artifact": "<reference>"}`.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::record::{ArtifactRef, Record};

use super::Renderer;

#[derive(Debug, Deserialize)]
struct RenderResponse {
    artifact: Option<String>,
}

pub struct HttpRenderer {
    config: RenderConfig,
    client: reqwest::Client,
}

impl HttpRenderer {
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RenderError::RequestFailed {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { config, client })
    }

    fn map_send_error(&self, e: reqwest::Error) -> RenderError {
        if e.is_timeout() {
            RenderError::Timeout {
                timeout: self.config.timeout,
            }
        } else {
            RenderError::RequestFailed {
                reason: e.to_string(),
            }
        }
    }
}

/// Pull the artifact reference out of a response body.
fn parse_artifact(body: &str) -> Result<ArtifactRef, RenderError> {
    let parsed: RenderResponse =
        serde_json::from_str(body).map_err(|e| RenderError::RequestFailed {
            reason: format!("Invalid render response: {e}"),
        })?;
    parsed
        .artifact
        .filter(|a| !a.trim().is_empty())
        .map(ArtifactRef)
        .ok_or(RenderError::MissingArtifact)
}

#[async_trait]
impl Renderer for HttpRenderer {
    fn name(&self) -> &str {
        "http"
    }

    async fn render(&self, record: &Record) -> Result<ArtifactRef, RenderError> {
        let mut request = self.client.post(&self.config.url).json(record);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        debug!(bytes = body.len(), "Render response received");
        parse_artifact(&body)
    }
}
