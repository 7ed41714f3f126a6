//! In-process vector index with on-disk snapshots
//!
//! Collections live in insertion-ordered maps guarded by an async RwLock;
//! searches never observe a half-written document. When a data directory is
//! configured, every insert rewrites the collection snapshot (MessagePack,
//! temp file + rename) so collections survive restarts. Corpora here are
//! small; a full rewrite per insert is simpler than a journal.

use super::models::{DocumentRecord, ScoredDocument};
use super::VectorIndex;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

type CollectionData = IndexMap<String, DocumentRecord>;

/// Cosine similarity between two vectors
///
/// Returns 0.0 for mismatched lengths or zero-norm inputs rather than
/// dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// In-process index backend
pub struct MemoryIndex {
    collections: RwLock<HashMap<String, CollectionData>>,
    data_dir: Option<PathBuf>,
}

impl MemoryIndex {
    /// Ephemeral index; contents are lost when the process exits
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            data_dir: None,
        }
    }

    /// Index that snapshots each collection under the given directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            data_dir: Some(data_dir.into()),
        }
    }

    fn snapshot_path(&self, collection: &str) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.mpk", collection)))
    }

    async fn load_snapshot(path: &Path) -> Result<CollectionData> {
        let bytes = tokio::fs::read(path).await?;
        rmp_serde::from_slice(&bytes).map_err(|e| RouterError::Serialization(e.to_string()))
    }

    async fn persist(&self, collection: &str, documents: &CollectionData) -> Result<()> {
        let Some(path) = self.snapshot_path(collection) else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let bytes =
            rmp_serde::to_vec(documents).map_err(|e| RouterError::Serialization(e.to_string()))?;

        // Write-then-rename keeps the snapshot readable if the process dies
        // mid-write.
        let tmp = path.with_extension("mpk.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(
            "Snapshot for '{}' written: {} document(s), {} bytes",
            collection,
            documents.len(),
            bytes.len()
        );
        Ok(())
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(collection) {
            return Ok(());
        }

        let documents = match self.snapshot_path(collection) {
            Some(path) if path.exists() => {
                let documents = Self::load_snapshot(&path).await?;
                info!(
                    "Restored collection '{}' from snapshot: {} document(s)",
                    collection,
                    documents.len()
                );
                documents
            }
            _ => {
                info!("Creating collection '{}'", collection);
                CollectionData::new()
            }
        };

        collections.insert(collection.to_string(), documents);
        Ok(())
    }

    async fn insert(&self, collection: &str, document: DocumentRecord) -> Result<()> {
        let mut collections = self.collections.write().await;
        let documents = collections
            .get_mut(collection)
            .ok_or_else(|| RouterError::Index(format!("unknown collection: {}", collection)))?;

        if documents.contains_key(&document.id) {
            return Err(RouterError::DuplicateId {
                collection: collection.to_string(),
                id: document.id,
            });
        }

        debug!("Inserting document id={} into '{}'", document.id, collection);
        documents.insert(document.id.clone(), document);

        self.persist(collection, documents).await
    }

    async fn contains(&self, collection: &str, id: &str) -> Result<bool> {
        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .ok_or_else(|| RouterError::Index(format!("unknown collection: {}", collection)))?;
        Ok(documents.contains_key(id))
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .ok_or_else(|| RouterError::Index(format!("unknown collection: {}", collection)))?;

        let mut scored: Vec<ScoredDocument> = documents
            .values()
            .map(|doc| ScoredDocument {
                id: doc.id.clone(),
                text: doc.text.clone(),
                metadata: doc.metadata.clone(),
                score: cosine_similarity(embedding, &doc.embedding),
            })
            .collect();

        // Stable sort: equal scores keep insertion order, making the top
        // result deterministic.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    async fn len(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .ok_or_else(|| RouterError::Index(format!("unknown collection: {}", collection)))?;
        Ok(documents.len())
    }
}
