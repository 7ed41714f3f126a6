//! Triple store implementation

use super::models::Fact;
use crate::error::{Result, RouterError};
use std::path::Path;
use tracing::{debug, info};

/// In-memory store of subject-predicate-object facts
///
/// Facts keep their load order: files are visited in sorted path order and
/// facts within a file in file order. Lookups return the first match in that
/// order, which is what makes "first match wins" deterministic.
#[derive(Debug, Default)]
pub struct TripleStore {
    facts: Vec<Fact>,
}

impl TripleStore {
    /// Create a store from facts already in memory
    pub fn from_facts(facts: Vec<Fact>) -> Self {
        Self { facts }
    }

    /// Load facts from a JSON array file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut store = Self::default();
        store.extend_from_file(path.as_ref())?;
        Ok(store)
    }

    /// Load facts from every file matching a glob pattern
    ///
    /// Matches are visited in sorted path order. A pattern with no matches
    /// yields an empty store.
    pub fn load_glob(pattern: &str) -> Result<Self> {
        let entries = glob::glob(pattern)
            .map_err(|e| RouterError::InvalidArgument(format!("invalid glob pattern: {}", e)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| RouterError::Io(e.into()))?;
            paths.push(path);
        }
        paths.sort();

        let mut store = Self::default();
        for path in &paths {
            store.extend_from_file(path)?;
        }

        info!("Loaded {} facts from {} file(s)", store.len(), paths.len());
        Ok(store)
    }

    fn extend_from_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)?;

        let facts: Vec<Fact> = serde_json::from_str(&raw).map_err(|e| RouterError::Parse {
            path: path.display().to_string(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })?;

        debug!("Loaded {} facts from {}", facts.len(), path.display());
        self.facts.extend(facts);
        Ok(())
    }

    /// Find the first fact whose subject contains the fragment,
    /// case-insensitively
    ///
    /// An empty fragment matches every subject and therefore returns the
    /// first fact, mirroring substring-CONTAINS semantics. No match is a
    /// normal `None`.
    pub fn find_by_subject_substring(&self, fragment: &str) -> Option<&Fact> {
        let needle = fragment.to_lowercase();
        self.facts
            .iter()
            .find(|fact| fact.subject.to_lowercase().contains(&needle))
    }

    /// Number of loaded facts
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether the store holds no facts
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// All facts in load order
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }
}
