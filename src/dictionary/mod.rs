//! Dictionary capability: label -> EPA fundamentals.
//!
//! The engine only sees the [`DictionaryService`] trait. The bundled
//! [`InMemoryDictionary`] serves YAML lexicons; [`ResilientDictionary`]
//! wraps any service with a per-call timeout and a small retry budget.

pub mod memory;
pub mod resilient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::epa::{Epa, Role};
use crate::error::ActResult;

pub use memory::{InMemoryDictionary, LexiconDef};
pub use resilient::ResilientDictionary;

/// Provenance of a looked-up term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermMetadata {
    pub dictionary: String,
    /// True when any component lies outside the instrument scale.
    #[serde(default)]
    pub out_of_range: bool,
}

/// Result of a dictionary lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub term: String,
    pub role: Role,
    pub epa: Epa,
    pub metadata: TermMetadata,
}

impl Term {
    pub fn new(
        term: impl Into<String>,
        role: Role,
        epa: Epa,
        dictionary: impl Into<String>,
    ) -> Self {
        Self {
            term: term.into(),
            role,
            epa,
            metadata: TermMetadata {
                dictionary: dictionary.into(),
                out_of_range: epa.is_out_of_range(),
            },
        }
    }
}

/// Source of EPA fundamentals, possibly remote.
#[async_trait]
pub trait DictionaryService: Send + Sync + std::fmt::Debug {
    /// Look up one label in a role partition. `NotFound` if absent.
    async fn lookup(&self, label: &str, role: Role, dictionary: &str) -> ActResult<Term>;

    /// Labels across all partitions containing `query` (case-insensitive),
    /// sorted and deduplicated. `None` lists everything.
    async fn search(&self, dictionary: &str, query: Option<&str>) -> ActResult<Vec<String>>;

    /// Every term of a role partition.
    async fn entries(&self, role: Role, dictionary: &str) -> ActResult<Vec<Term>>;

    /// Names of the dictionaries this service knows.
    async fn dictionaries(&self) -> ActResult<Vec<String>>;
}

/// Canonical label form: trimmed, lowercase, inner whitespace as `_`.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Doctor"), "doctor");
        assert_eq!(normalize_label("  police   officer "), "police_officer");
        assert_eq!(normalize_label("already_ok"), "already_ok");
    }

    #[test]
    fn test_term_flags_out_of_range() {
        let t = Term::new("x", Role::Identity, Epa::new(4.5, 0.0, 0.0), "d");
        assert!(t.metadata.out_of_range);
        let t = Term::new("y", Role::Identity, Epa::new(1.0, 0.0, 0.0), "d");
        assert!(!t.metadata.out_of_range);
    }

    #[test]
    fn test_term_serializes_epa_as_array() {
        let t = Term::new("doctor", Role::Identity, Epa::new(2.53, 2.35, 0.41), "us_2015");
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["epa"], serde_json::json!([2.53, 2.35, 0.41]));
        assert_eq!(v["role"], "identity");
        assert_eq!(v["metadata"]["dictionary"], "us_2015");
    }
}
