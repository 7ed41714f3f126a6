//! HTTP API for the retrieval router
//!
//! - POST /api/v1/query - Resolve a query through the tier chain
//! - POST /api/v1/ingest - Ingest question/answer pairs
//! - GET /health - Liveness check
//! - GET /metrics - Prometheus metrics

pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, AppState, IngestRequest, QueryRequest, QueryResponse};
pub use routes::build_router;
