//! Error types for the retrieval router

use crate::router::TierKind;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, RouterError>;

/// Errors produced by the retrieval router and its stores
///
/// "No match" outcomes are never errors: an empty search result or a missed
/// fact lookup is a normal value that triggers escalation. Everything here is
/// a genuine failure and aborts the operation that produced it.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Malformed knowledge or corpus source
    #[error("parse error in {path} at line {line}, column {column}: {message}")]
    Parse {
        path: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// Caller violated a precondition (empty text, k < 1, missing metadata)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A document id was re-used within a collection
    #[error("duplicate document id '{id}' in collection '{collection}'")]
    DuplicateId { collection: String, id: String },

    /// A tier failed while resolving a query; carries which tier failed
    #[error("{tier} tier failed: {source}")]
    Tier {
        tier: TierKind,
        #[source]
        source: Box<RouterError>,
    },

    /// A tier exceeded its per-query deadline
    #[error("tier timed out after {elapsed_ms}ms")]
    TierTimeout { elapsed_ms: u64 },

    /// Every tier in a custom chain reported "no match"
    ///
    /// The standard chain cannot produce this: its terminal fallback tier
    /// always answers. Seeing it means the chain was misconfigured.
    #[error("no tier produced an answer")]
    Exhausted,

    /// Embedding computation failed
    #[error("encoder error: {0}")]
    Encoder(String),

    /// Vector index backend failure
    #[error("vector index error: {0}")]
    Index(String),

    /// Snapshot or payload codec failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration loading failure
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl RouterError {
    /// Wrap an error with the tier it occurred in
    pub fn in_tier(self, tier: TierKind) -> Self {
        RouterError::Tier {
            tier,
            source: Box::new(self),
        }
    }

    /// The tier a resolution error originated in, if any
    pub fn tier(&self) -> Option<TierKind> {
        match self {
            RouterError::Tier { tier, .. } => Some(*tier),
            _ => None,
        }
    }
}
