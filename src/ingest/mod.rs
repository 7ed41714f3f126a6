//! Corpus ingestion
//!
//! Loads a question/answer corpus and writes each pair into the vector
//! store. Ids are the pair's position in the corpus as a string, starting at
//! "0", so re-ingesting the same corpus addresses the same documents; pairs
//! whose id already exists are skipped, making re-ingestion a no-op.

use crate::error::{Result, RouterError};
use crate::metrics::METRICS;
use crate::vector::{Collection, VectorStore};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// One corpus entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Outcome of an ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub ingested: usize,
    pub skipped: usize,
}

/// Writes question/answer corpora into the vector store
pub struct IngestionPipeline {
    store: Arc<VectorStore>,
    concurrency: usize,
}

impl IngestionPipeline {
    /// Create a pipeline embedding up to `concurrency` documents at once
    pub fn new(store: Arc<VectorStore>, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Load a corpus from a JSON array file
    pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<QaPair>> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;

        serde_json::from_str(&raw).map_err(|e| RouterError::Parse {
            path: path.display().to_string(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })
    }

    /// Ingest pairs, skipping those already present
    ///
    /// Each pair's id is its corpus position as a string ("0", "1", ...).
    /// Writes stay isolated per document; only embedding computation runs
    /// concurrently.
    pub async fn ingest(&self, collection: &Collection, pairs: &[QaPair]) -> Result<IngestReport> {
        // Jobs must own their entries: futures borrowing the slice items
        // trip rustc's higher-ranked lifetime check under axum's handler
        // bounds.
        let entries: Vec<(String, QaPair)> = pairs
            .iter()
            .enumerate()
            .map(|(position, pair)| (position.to_string(), pair.clone()))
            .collect();

        let jobs = entries.into_iter().map(|(id, pair)| async move {
            if self.store.contains(collection, &id).await? {
                debug!("Skipping existing document id={}", id);
                return Ok::<bool, RouterError>(false);
            }

            let mut metadata = HashMap::new();
            metadata.insert("question".to_string(), pair.question);
            metadata.insert(
                "ingested_at".to_string(),
                chrono::Utc::now().to_rfc3339(),
            );

            self.store
                .add(collection, &id, &pair.answer, metadata)
                .await?;
            Ok(true)
        });

        let outcomes: Vec<bool> = stream::iter(jobs)
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        let ingested = outcomes.iter().filter(|inserted| **inserted).count();
        let skipped = outcomes.len() - ingested;

        METRICS.record_ingest("ingested", ingested);
        METRICS.record_ingest("skipped", skipped);
        info!(
            "Ingestion into '{}' finished: {} ingested, {} skipped",
            collection.name(),
            ingested,
            skipped
        );

        Ok(IngestReport { ingested, skipped })
    }

    /// Load a corpus file and ingest it
    pub async fn ingest_file(
        &self,
        collection: &Collection,
        path: impl AsRef<Path>,
    ) -> Result<IngestReport> {
        let pairs = Self::load_corpus(path)?;
        self.ingest(collection, &pairs).await
    }
}
