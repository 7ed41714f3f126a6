//! Structured knowledge base
//!
//! Holds subject-predicate-object facts loaded from JSON and answers
//! case-insensitive substring lookups over subjects. This is the cheapest
//! retrieval tier: an exact structural hit here short-circuits everything
//! else.

pub mod models;
pub mod store;

pub use models::Fact;
pub use store::TripleStore;
