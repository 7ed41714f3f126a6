//! Tier adapters over the concrete stores

use super::{Tier, TierKind, TierMatch};
use crate::error::Result;
use crate::fallback::FallbackResponder;
use crate::knowledge::TripleStore;
use crate::vector::{Collection, VectorStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Structural lookup tier over the triple store
///
/// A hit answers with the matched fact's object; provenance carries the
/// subject and predicate.
pub struct KnowledgeTier {
    facts: Arc<TripleStore>,
}

impl KnowledgeTier {
    pub fn new(facts: Arc<TripleStore>) -> Self {
        Self { facts }
    }
}

#[async_trait]
impl Tier for KnowledgeTier {
    fn kind(&self) -> TierKind {
        TierKind::KnowledgeBase
    }

    async fn try_answer(&self, query_text: &str) -> Result<Option<TierMatch>> {
        let Some(fact) = self.facts.find_by_subject_substring(query_text) else {
            return Ok(None);
        };

        debug!("Knowledge base matched subject '{}'", fact.subject);

        let mut provenance = HashMap::new();
        provenance.insert("subject".to_string(), fact.subject.clone());
        provenance.insert("predicate".to_string(), fact.predicate.clone());

        Ok(Some(TierMatch {
            answer: fact.object.clone(),
            score: None,
            provenance,
        }))
    }
}

/// Semantic search tier over the vector store
///
/// Answers with the top document's text; an empty result escalates.
pub struct VectorTier {
    store: Arc<VectorStore>,
    collection: Collection,
    top_k: usize,
}

impl VectorTier {
    pub fn new(store: Arc<VectorStore>, collection: Collection, top_k: usize) -> Self {
        Self {
            store,
            collection,
            top_k,
        }
    }
}

#[async_trait]
impl Tier for VectorTier {
    fn kind(&self) -> TierKind {
        TierKind::VectorSearch
    }

    async fn try_answer(&self, query_text: &str) -> Result<Option<TierMatch>> {
        let results = self
            .store
            .query(&self.collection, query_text, self.top_k)
            .await?;

        let Some(top) = results.into_iter().next() else {
            return Ok(None);
        };

        debug!(
            "Vector search matched document id={} (score {:.4})",
            top.id, top.score
        );

        Ok(Some(TierMatch {
            answer: top.text,
            score: Some(top.score),
            provenance: top.metadata,
        }))
    }
}

/// Terminal tier: always answers
pub struct FallbackTier {
    responder: Arc<FallbackResponder>,
}

impl FallbackTier {
    pub fn new(responder: Arc<FallbackResponder>) -> Self {
        Self { responder }
    }
}

#[async_trait]
impl Tier for FallbackTier {
    fn kind(&self) -> TierKind {
        TierKind::Fallback
    }

    async fn try_answer(&self, query_text: &str) -> Result<Option<TierMatch>> {
        let answer = self.responder.respond(query_text).await?;

        Ok(Some(TierMatch {
            answer,
            score: None,
            provenance: HashMap::new(),
        }))
    }
}
