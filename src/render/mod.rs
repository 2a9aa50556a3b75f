//! Render collaborator: turns a completed record into an artifact.
//!
//! Rendering is opaque to the flow: it hands over a [`Record`] and gets an
//! [`ArtifactRef`] or a failure back. Failures degrade the result screen;
//! they never abort the flow.

mod http;

pub use http::HttpRenderer;

use async_trait::async_trait;

use crate::error::RenderError;
use crate::record::{ArtifactRef, Record};

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Short backend name, reported with render telemetry.
    fn name(&self) -> &str;

    async fn render(&self, record: &Record) -> Result<ArtifactRef, RenderError>;
}

/// Renderer used when no endpoint is configured. Always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRenderer;

#[async_trait]
impl Renderer for UnavailableRenderer {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn render(&self, _record: &Record) -> Result<ArtifactRef, RenderError> {
        Err(RenderError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PartialRecord, RecordField};

    #[tokio::test]
    async fn unavailable_renderer_always_fails() {
        let mut partial = PartialRecord::new();
        for field in RecordField::ALL {
            partial.set(field, "x");
        }
        let record = partial.complete().unwrap();
        let err = UnavailableRenderer.render(&record).await.unwrap_err();
        assert!(matches!(err, RenderError::NotConfigured));
    }
}
