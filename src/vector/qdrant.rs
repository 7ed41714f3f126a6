//! Qdrant-backed vector index

use super::models::{DocumentRecord, ScoredDocument};
use super::VectorIndex;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use qdrant_client::{
    client::{Payload, QdrantClient},
    qdrant::{
        condition::ConditionOneOf, r#match::MatchValue, value::Kind,
        with_payload_selector::SelectorOptions, Condition, CreateCollection, Distance,
        FieldCondition, Filter, Match, PointStruct, ScrollPoints, SearchPoints, Value,
        VectorParams, VectorsConfig, WithPayloadSelector,
    },
};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Qdrant gRPC index backend
///
/// Point ids are UUIDv5 digests of the document id, so the same document id
/// always maps to the same point. The original string id travels in the
/// payload under `doc_id` together with the text and JSON-encoded metadata.
pub struct QdrantIndex {
    client: QdrantClient,
    vector_size: usize,
}

impl QdrantIndex {
    /// Connect to a Qdrant instance
    pub fn connect(url: &str, vector_size: usize) -> Result<Self> {
        let client = QdrantClient::from_url(url)
            .build()
            .map_err(|e| RouterError::Index(format!("failed to connect to qdrant: {}", e)))?;

        Ok(Self {
            client,
            vector_size,
        })
    }

    fn point_uuid(id: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes()).to_string()
    }

    fn doc_id_filter(id: &str) -> Filter {
        Filter {
            must: vec![Condition {
                condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                    key: "doc_id".to_string(),
                    r#match: Some(Match {
                        match_value: Some(MatchValue::Keyword(id.to_string())),
                    }),
                    ..Default::default()
                })),
            }],
            ..Default::default()
        }
    }

    fn document_from_payload(
        payload: &HashMap<String, Value>,
        score: f32,
    ) -> Option<ScoredDocument> {
        let id = value_as_str(payload.get("doc_id")?)?.to_string();
        let text = value_as_str(payload.get("text")?)?.to_string();

        let metadata = match payload.get("metadata").and_then(value_as_str) {
            Some(raw) => match serde_json::from_str(raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Discarding unreadable metadata for doc_id={}: {}", id, e);
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        Some(ScoredDocument {
            id,
            text,
            metadata,
            score,
        })
    }
}

fn value_as_str(value: &Value) -> Option<&str> {
    match value.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.as_str()),
        _ => None,
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self, collection: &str) -> Result<()> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| RouterError::Index(format!("failed to list collections: {}", e)))?;

        let exists = collections.collections.iter().any(|c| c.name == collection);

        if !exists {
            info!("Creating collection: {}", collection);

            self.client
                .create_collection(&CreateCollection {
                    collection_name: collection.to_string(),
                    vectors_config: Some(VectorsConfig {
                        config: Some(qdrant_client::qdrant::vectors_config::Config::Params(
                            VectorParams {
                                size: self.vector_size as u64,
                                distance: Distance::Cosine.into(),
                                ..Default::default()
                            },
                        )),
                    }),
                    ..Default::default()
                })
                .await
                .map_err(|e| RouterError::Index(format!("failed to create collection: {}", e)))?;
        }

        Ok(())
    }

    async fn insert(&self, collection: &str, document: DocumentRecord) -> Result<()> {
        if self.contains(collection, &document.id).await? {
            return Err(RouterError::DuplicateId {
                collection: collection.to_string(),
                id: document.id,
            });
        }

        let metadata_json = serde_json::to_string(&document.metadata)
            .map_err(|e| RouterError::Serialization(e.to_string()))?;

        let mut payload = Payload::new();
        payload.insert("doc_id", document.id.clone());
        payload.insert("text", document.text.clone());
        payload.insert("metadata", metadata_json);

        let point = PointStruct::new(
            Self::point_uuid(&document.id),
            document.embedding.clone(),
            payload,
        );

        debug!("Upserting document id={} into '{}'", document.id, collection);

        self.client
            .upsert_points(collection, None, vec![point], None)
            .await
            .map_err(|e| RouterError::Index(format!("failed to upsert point: {}", e)))?;

        Ok(())
    }

    async fn contains(&self, collection: &str, id: &str) -> Result<bool> {
        let with_payload = WithPayloadSelector {
            selector_options: Some(SelectorOptions::Enable(false)),
        };

        let scroll_result = self
            .client
            .scroll(&ScrollPoints {
                collection_name: collection.to_string(),
                filter: Some(Self::doc_id_filter(id)),
                limit: Some(1u32),
                with_payload: Some(with_payload),
                ..Default::default()
            })
            .await
            .map_err(|e| RouterError::Index(format!("failed to check for document: {}", e)))?;

        Ok(!scroll_result.result.is_empty())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let search_result = self
            .client
            .search_points(&SearchPoints {
                collection_name: collection.to_string(),
                vector: embedding.to_vec(),
                limit: k as u64,
                with_payload: Some(true.into()),
                ..Default::default()
            })
            .await
            .map_err(|e| RouterError::Index(format!("search failed: {}", e)))?;

        let documents = search_result
            .result
            .iter()
            .filter_map(|point| Self::document_from_payload(&point.payload, point.score))
            .collect();

        Ok(documents)
    }

    async fn len(&self, collection: &str) -> Result<usize> {
        let info = self
            .client
            .collection_info(collection)
            .await
            .map_err(|e| RouterError::Index(format!("failed to read collection info: {}", e)))?;

        Ok(info
            .result
            .and_then(|r| r.points_count)
            .unwrap_or(0) as usize)
    }
}
