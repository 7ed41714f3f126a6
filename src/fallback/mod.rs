//! Neural fallback responder
//!
//! The terminal tier. Runs the query through the encoder (the model forward
//! pass) and returns a configured placeholder response, so a well-formed
//! query always gets an answer. Encoder failures are genuine errors and
//! propagate; they are never masked as answers.

use crate::encoder::Encoder;
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;

/// Placeholder answer generator backed by the encoder
pub struct FallbackResponder {
    encoder: Arc<dyn Encoder>,
    template: String,
}

impl FallbackResponder {
    /// Create a responder with a response template
    ///
    /// `{query}` in the template is replaced with the query text.
    pub fn new(encoder: Arc<dyn Encoder>, template: impl Into<String>) -> Self {
        Self {
            encoder,
            template: template.into(),
        }
    }

    /// Produce a best-effort answer; never "no answer"
    pub async fn respond(&self, query_text: &str) -> Result<String> {
        let embedding = self.encoder.encode(query_text).await?;
        debug!(
            "Fallback encoded query into {} dims, emitting placeholder",
            embedding.len()
        );

        Ok(self.template.replace("{query}", query_text))
    }
}
