//! HTTP client for a remote embedding service
//!
//! Wraps the embedding endpoint with a request timeout, bounded retry with
//! exponential backoff and jitter, and a semaphore capping in-flight
//! requests.

use super::Encoder;
use crate::config::EmbeddingConfig;
use crate::error::{Result, RouterError};
use crate::metrics::METRICS;
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Remote embedding service client
pub struct HttpEncoder {
    http: Client,
    config: EmbeddingConfig,
    semaphore: Arc<Semaphore>,
}

impl HttpEncoder {
    /// Create a new client from embedding configuration
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RouterError::Encoder(e.to_string()))?;

        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_requests.max(1)));

        Ok(Self {
            http,
            config,
            semaphore,
        })
    }

    async fn call_api(&self, text: &str) -> Result<Vec<f32>> {
        let request_body = serde_json::json!({ "input": text });

        let mut req = self.http.post(&self.config.api_url).json(&request_body);

        if let Some(token) = &self.config.api_token {
            req = req.bearer_auth(token.expose_secret());
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                RouterError::Encoder(format!("embedding request timed out: {}", e))
            } else {
                RouterError::Encoder(format!("embedding request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RouterError::Encoder(format!(
                "embedding service returned {}: {}",
                status, error_text
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RouterError::Encoder(format!("invalid embedding response: {}", e)))?;

        if parsed.embedding.len() != self.config.dimension {
            return Err(RouterError::Encoder(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.config.dimension,
                parsed.embedding.len()
            )));
        }

        Ok(parsed.embedding)
    }

    /// Exponential backoff base for the given attempt (jitter added at sleep time)
    fn base_backoff(&self, attempt: usize) -> Duration {
        let base = self.config.retry_backoff();
        base.saturating_mul(2_u32.pow((attempt - 1) as u32))
    }

    fn jitter(&self) -> Duration {
        let half_base_ms = self.config.retry_backoff_ms / 2;
        Duration::from_millis(rand::thread_rng().gen_range(0..=half_base_ms))
    }
}

#[async_trait]
impl Encoder for HttpEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RouterError::Encoder("encoder semaphore closed".to_string()))?;

        debug!("Encoding {} chars via {}", text.len(), self.config.api_url);

        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.call_api(text).await {
                Ok(embedding) => {
                    METRICS.record_encoder_request(true);
                    return Ok(embedding);
                }
                Err(e) => {
                    METRICS.record_encoder_request(false);

                    if attempt > self.config.retry_attempts {
                        error!("Embedding failed after {} attempts: {}", attempt, e);
                        return Err(e);
                    }

                    let backoff = self.base_backoff(attempt) + self.jitter();
                    warn!(
                        "Embedding attempt {} failed: {}, retrying in {:?}",
                        attempt, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}
