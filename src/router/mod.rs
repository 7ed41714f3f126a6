//! Tiered query routing
//!
//! The router tries an ordered chain of tiers and returns the first match.
//! The escalation policy is strict: a tier reporting "no match" (`Ok(None)`)
//! hands the query to the next tier, while a tier error aborts the whole
//! query tagged with the failing tier. The router never substitutes a
//! fallback answer for a genuine failure.

pub mod tiers;

pub use tiers::{FallbackTier, KnowledgeTier, VectorTier};

use crate::error::{Result, RouterError};
use crate::metrics::METRICS;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const DEFAULT_TIER_TIMEOUT: Duration = Duration::from_secs(10);

/// Which tier produced an answer (or failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    KnowledgeBase,
    VectorSearch,
    Fallback,
}

impl TierKind {
    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::KnowledgeBase => "knowledge_base",
            TierKind::VectorSearch => "vector_search",
            TierKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful answer from a tier
#[derive(Debug, Clone)]
pub struct TierMatch {
    pub answer: String,
    /// Similarity score where the tier has one
    pub score: Option<f32>,
    /// Where the answer came from (fact subject, source question, ...)
    pub provenance: HashMap<String, String>,
}

/// One knowledge source in the escalation chain
///
/// `Ok(Some(_))` is a match, `Ok(None)` escalates, `Err(_)` aborts the
/// query.
#[async_trait]
pub trait Tier: Send + Sync {
    /// Which tier this is, for tagging answers and errors
    fn kind(&self) -> TierKind;

    /// Attempt to answer the query
    async fn try_answer(&self, query_text: &str) -> Result<Option<TierMatch>>;
}

/// A resolved query: the answer plus which tier produced it
#[derive(Debug, Clone, Serialize)]
pub struct RouterResponse {
    pub answer: String,
    pub tier: TierKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub provenance: HashMap<String, String>,
}

/// Ordered escalation chain over retrieval tiers
///
/// Holds no per-query state and is read-only on the stores, so a single
/// router can serve concurrent queries.
pub struct QueryRouter {
    tiers: Vec<Arc<dyn Tier>>,
    tier_timeout: Duration,
}

impl QueryRouter {
    /// Build a router over an arbitrary tier chain
    pub fn new(tiers: Vec<Arc<dyn Tier>>) -> Self {
        Self {
            tiers,
            tier_timeout: DEFAULT_TIER_TIMEOUT,
        }
    }

    /// The canonical chain: knowledge base, then vector search, then
    /// fallback
    ///
    /// The fallback tier always answers, so this chain cannot exhaust.
    pub fn standard(knowledge: KnowledgeTier, vector: VectorTier, fallback: FallbackTier) -> Self {
        Self::new(vec![
            Arc::new(knowledge),
            Arc::new(vector),
            Arc::new(fallback),
        ])
    }

    /// Override the per-tier deadline
    pub fn with_tier_timeout(mut self, timeout: Duration) -> Self {
        self.tier_timeout = timeout;
        self
    }

    /// Number of tiers in the chain
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Resolve a query through the chain
    ///
    /// Returns `Exhausted` if every tier reports "no match"; the standard
    /// chain cannot hit that because its terminal tier always answers.
    pub async fn resolve(&self, query_text: &str) -> Result<RouterResponse> {
        let started = Instant::now();

        for tier in &self.tiers {
            let kind = tier.kind();
            let tier_started = Instant::now();

            let outcome =
                match tokio::time::timeout(self.tier_timeout, tier.try_answer(query_text)).await {
                    Ok(result) => result,
                    Err(_) => Err(RouterError::TierTimeout {
                        elapsed_ms: self.tier_timeout.as_millis() as u64,
                    }),
                };

            METRICS
                .tier_duration
                .with_label_values(&[kind.as_str()])
                .observe(tier_started.elapsed().as_secs_f64());

            match outcome {
                Ok(Some(matched)) => {
                    METRICS.record_tier(kind.as_str(), "hit");
                    METRICS
                        .resolve_duration
                        .observe(started.elapsed().as_secs_f64());
                    info!("Query answered by {} tier", kind);

                    return Ok(RouterResponse {
                        answer: matched.answer,
                        tier: kind,
                        score: matched.score,
                        provenance: matched.provenance,
                    });
                }
                Ok(None) => {
                    METRICS.record_tier(kind.as_str(), "miss");
                    debug!("{} tier had no match, escalating", kind);
                }
                Err(e) => {
                    METRICS.record_tier(kind.as_str(), "error");
                    warn!("{} tier failed: {}", kind, e);
                    return Err(e.in_tier(kind));
                }
            }
        }

        METRICS
            .resolve_duration
            .observe(started.elapsed().as_secs_f64());
        Err(RouterError::Exhausted)
    }
}
