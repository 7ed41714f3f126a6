//! Configuration for the retrieval router
//!
//! Settings are loaded from an optional TOML file plus `ROUTER__`-prefixed
//! environment variables (double underscore separates nesting levels, e.g.
//! `ROUTER__EMBEDDING__API_TOKEN`). Every field has a default so the service
//! starts with no configuration at all.

use crate::error::Result;
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub vector_db: VectorDbConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::from_file("config")
    }

    /// Load from a named file plus environment overrides
    pub fn from_file(name: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(config::Environment::with_prefix("ROUTER").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Which encoder implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic in-process feature hashing (no network)
    Hashing,
    /// Remote embedding service over HTTP
    Remote,
}

/// Embedding encoder configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: EmbeddingProvider,

    /// Remote embedding service endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token for the remote service (set via ROUTER__EMBEDDING__API_TOKEN)
    #[serde(default)]
    pub api_token: Option<SecretString>,

    /// Embedding vector dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Encoder cache capacity in entries; 0 disables caching
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Remote request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry attempts after the first failed remote request
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    /// Base backoff between retries in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum in-flight remote requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

fn default_provider() -> EmbeddingProvider {
    EmbeddingProvider::Hashing
}
fn default_api_url() -> String {
    "http://localhost:8089/v1/embeddings".to_string()
}
fn default_dimension() -> usize {
    384
}
fn default_cache_capacity() -> u64 {
    2048
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_retry_attempts() -> usize {
    2
}
fn default_retry_backoff_ms() -> u64 {
    200
}
fn default_max_concurrent() -> usize {
    8
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            api_token: None,
            dimension: default_dimension(),
            cache_capacity: default_cache_capacity(),
            timeout_ms: default_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl EmbeddingConfig {
    /// Remote request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base retry backoff as Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Which vector index backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    /// In-process index with on-disk snapshots
    Memory,
    /// Qdrant over gRPC
    Qdrant,
}

/// Vector index configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VectorDbConfig {
    #[serde(default = "default_backend")]
    pub backend: VectorBackend,

    /// Qdrant gRPC URL
    #[serde(default = "default_qdrant_url")]
    pub url: String,

    /// Snapshot directory for the memory backend; unset means ephemeral
    #[serde(default = "default_data_dir")]
    pub data_dir: Option<String>,

    /// Collection holding the document corpus
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Vector dimension the backend stores; must match the encoder
    #[serde(default = "default_dimension")]
    pub vector_size: usize,
}

fn default_backend() -> VectorBackend {
    VectorBackend::Memory
}
fn default_qdrant_url() -> String {
    "http://localhost:6334".to_string()
}
fn default_data_dir() -> Option<String> {
    Some("data/index".to_string())
}
fn default_collection_name() -> String {
    "biomedical_faq".to_string()
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_qdrant_url(),
            data_dir: default_data_dir(),
            collection_name: default_collection_name(),
            vector_size: default_dimension(),
        }
    }
}

/// Structured knowledge source configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct KnowledgeConfig {
    /// Single JSON fact file
    #[serde(default)]
    pub facts_path: Option<String>,

    /// Glob pattern for multiple fact files, loaded in sorted path order;
    /// takes precedence over `facts_path` when both are set
    #[serde(default)]
    pub facts_glob: Option<String>,
}

/// Neural fallback configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    /// Response template; `{query}` is replaced with the query text
    #[serde(default = "default_response_template")]
    pub response_template: String,
}

fn default_response_template() -> String {
    "Generated response from the neural fallback model (placeholder)".to_string()
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            response_template: default_response_template(),
        }
    }
}

/// Query routing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Per-tier deadline in milliseconds; expiry is a tier error
    #[serde(default = "default_tier_timeout_ms")]
    pub tier_timeout_ms: u64,

    /// Nearest neighbors requested from the vector tier
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_tier_timeout_ms() -> u64 {
    10_000
}
fn default_top_k() -> usize {
    1
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            tier_timeout_ms: default_tier_timeout_ms(),
            top_k: default_top_k(),
        }
    }
}

impl RouterConfig {
    /// Per-tier deadline as Duration
    pub fn tier_timeout(&self) -> Duration {
        Duration::from_millis(self.tier_timeout_ms)
    }
}

/// Corpus ingestion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IngestionConfig {
    /// JSON corpus ingested at startup; unset skips startup ingestion
    #[serde(default)]
    pub corpus_path: Option<String>,

    /// Documents embedded concurrently during ingestion
    #[serde(default = "default_ingest_concurrency")]
    pub concurrency: usize,
}

fn default_ingest_concurrency() -> usize {
    4
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            corpus_path: None,
            concurrency: default_ingest_concurrency(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request body size limit in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8081
}
fn default_max_body_bytes() -> usize {
    262_144
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter; RUST_LOG overrides when set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted log lines
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
