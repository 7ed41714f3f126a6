//! Data models for the vector store

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Handle to a named collection
///
/// Obtained from `VectorStore::ensure_collection`; holding one means the
/// collection exists (or existed at lookup time for remote backends).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    name: String,
}

impl Collection {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Stored document: the unit of the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique within a collection; assigned at ingestion and never reused
    pub id: String,
    /// Answer content; never empty
    pub text: String,
    /// Must carry at least a non-empty `question` entry
    pub metadata: HashMap<String, String>,
    /// Computed from `text` at insertion time; never mutated afterwards
    pub embedding: Vec<f32>,
}

/// A document returned from a similarity search
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub id: String,
    pub text: String,
    pub metadata: HashMap<String, String>,
    /// Cosine similarity against the query embedding
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_name() {
        let collection = Collection::new("biomedical_faq");
        assert_eq!(collection.name(), "biomedical_faq");
    }

    #[test]
    fn test_document_record_round_trip() {
        let mut metadata = HashMap::new();
        metadata.insert("question".to_string(), "What is COVID-19?".to_string());

        let record = DocumentRecord {
            id: "0".to_string(),
            text: "COVID-19 is a disease caused by the SARS-CoV-2 virus.".to_string(),
            metadata,
            embedding: vec![0.5, 0.5],
        };

        let bytes = rmp_serde::to_vec(&record).unwrap();
        let decoded: DocumentRecord = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded.id, "0");
        assert_eq!(decoded.metadata.get("question").unwrap(), "What is COVID-19?");
    }
}
