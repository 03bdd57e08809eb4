//! YAML-backed in-memory lexicons.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::epa::{Epa, Role};
use crate::error::{ActError, ActResult};

use super::{normalize_label, DictionaryService, Term};

/// Built-in lexicons.
const BUILTIN_LEXICONS: &[&str] = &[include_str!("../../data/dictionaries/us_2015.yaml")];

/// On-disk lexicon format.
///
/// ```yaml
/// name: us_2015
/// description: Sample US 2015 lexicon
/// terms:
///   identity:
///     doctor: [2.53, 2.35, 0.41]
///   behavior:
///     help: [2.55, 1.85, 0.35]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub terms: BTreeMap<Role, BTreeMap<String, Epa>>,
}

impl LexiconDef {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_yaml_file(path: &str) -> ActResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }
}

/// A lexicon with normalised labels.
#[derive(Debug, Clone, Default)]
struct Lexicon {
    terms: BTreeMap<Role, BTreeMap<String, Epa>>,
}

/// Dictionary service over lexicons held in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDictionary {
    lexicons: HashMap<String, Lexicon>,
}

impl InMemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dictionary holding the bundled lexicons.
    pub fn builtin() -> ActResult<Self> {
        let mut dict = Self::new();
        for yaml in BUILTIN_LEXICONS {
            dict.load_yaml(yaml)?;
        }
        Ok(dict)
    }

    /// Merge a lexicon definition, replacing labels that already exist.
    ///
    /// Returns the number of terms added. Nothing is merged if any value is
    /// not finite.
    pub fn insert(&mut self, def: LexiconDef) -> ActResult<usize> {
        let name = normalize_label(&def.name);
        if name.is_empty() {
            return Err(ActError::config("lexicon without a name"));
        }
        for (role, terms) in &def.terms {
            if let Some((label, _)) = terms.iter().find(|(_, epa)| !epa.is_finite()) {
                return Err(ActError::config(format!(
                    "lexicon {}: {} '{}' has a non-finite EPA",
                    name, role, label
                )));
            }
        }
        let lexicon = self.lexicons.entry(name.clone()).or_default();
        let mut count = 0;
        for (role, terms) in def.terms {
            let partition = lexicon.terms.entry(role).or_default();
            for (label, epa) in terms {
                partition.insert(normalize_label(&label), epa);
                count += 1;
            }
        }
        log::info!("Loaded {} terms into lexicon {}", count, name);
        Ok(count)
    }

    pub fn load_yaml(&mut self, yaml: &str) -> ActResult<usize> {
        self.insert(LexiconDef::from_yaml(yaml)?)
    }

    pub fn load_file(&mut self, path: &str) -> ActResult<usize> {
        self.insert(LexiconDef::from_yaml_file(path)?)
    }

    /// Load every `*.yaml`/`*.yml` file in `dir`.
    ///
    /// Files that fail to parse are logged and skipped. A missing directory
    /// loads nothing.
    pub fn load_directory(&mut self, dir: &Path) -> ActResult<usize> {
        if !dir.exists() {
            return Ok(0);
        }
        let mut total = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml") {
                match self.load_file(path.to_str().unwrap_or_default()) {
                    Ok(n) => total += n,
                    Err(e) => log::warn!("Skipping lexicon {:?}: {}", path, e),
                }
            }
        }
        Ok(total)
    }

    fn lexicon(&self, dictionary: &str) -> ActResult<&Lexicon> {
        self.lexicons
            .get(&normalize_label(dictionary))
            .ok_or_else(|| ActError::NotFound(format!("dictionary '{}'", dictionary)))
    }
}

#[async_trait]
impl DictionaryService for InMemoryDictionary {
    async fn lookup(&self, label: &str, role: Role, dictionary: &str) -> ActResult<Term> {
        let lexicon = self.lexicon(dictionary)?;
        let key = normalize_label(label);
        lexicon
            .terms
            .get(&role)
            .and_then(|p| p.get(&key))
            .map(|epa| Term::new(key.clone(), role, *epa, normalize_label(dictionary)))
            .ok_or_else(|| {
                ActError::NotFound(format!("{} '{}' in dictionary '{}'", role, label, dictionary))
            })
    }

    async fn search(&self, dictionary: &str, query: Option<&str>) -> ActResult<Vec<String>> {
        let lexicon = self.lexicon(dictionary)?;
        let needle = query.map(normalize_label).unwrap_or_default();
        let mut labels: Vec<String> = lexicon
            .terms
            .values()
            .flat_map(|p| p.keys())
            .filter(|label| label.contains(&needle))
            .cloned()
            .collect();
        labels.sort();
        labels.dedup();
        Ok(labels)
    }

    async fn entries(&self, role: Role, dictionary: &str) -> ActResult<Vec<Term>> {
        let name = normalize_label(dictionary);
        let lexicon = self.lexicon(dictionary)?;
        Ok(lexicon
            .terms
            .get(&role)
            .map(|p| {
                p.iter()
                    .map(|(label, epa)| Term::new(label.clone(), role, *epa, name.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn dictionaries(&self) -> ActResult<Vec<String>> {
        let mut names: Vec<String> = self.lexicons.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRA: &str = r#"
name: tiny
terms:
  identity:
    Police Officer: [1.6, 2.2, 0.9]
  behavior:
    arrest: [0.2, 2.0, 1.3]
"#;

    #[tokio::test]
    async fn test_builtin_lookup_is_case_insensitive() {
        let dict = InMemoryDictionary::builtin().unwrap();
        let t = dict.lookup(" Doctor ", Role::Identity, "us_2015").await.unwrap();
        assert_eq!(t.term, "doctor");
        assert_eq!(t.epa, Epa::new(2.53, 2.35, 0.41));
        assert_eq!(t.metadata.dictionary, "us_2015");
    }

    #[tokio::test]
    async fn test_lookup_wrong_partition_is_not_found() {
        let dict = InMemoryDictionary::builtin().unwrap();
        let err = dict.lookup("help", Role::Identity, "us_2015").await.unwrap_err();
        assert!(matches!(err, ActError::NotFound(_)));
        let err = dict.lookup("doctor", Role::Identity, "nope").await.unwrap_err();
        assert!(matches!(err, ActError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_spans_partitions_and_dedups() {
        let dict = InMemoryDictionary::builtin().unwrap();
        // "angry" is both a modifier and an emotion.
        let hits = dict.search("us_2015", Some("ANGR")).await.unwrap();
        assert_eq!(hits, vec!["angry".to_string()]);
        let all = dict.search("us_2015", None).await.unwrap();
        assert!(all.windows(2).all(|w| w[0] < w[1]));
        assert!(all.contains(&"hospital".to_string()));
    }

    #[tokio::test]
    async fn test_multiword_labels_are_normalised() {
        let mut dict = InMemoryDictionary::new();
        assert_eq!(dict.load_yaml(EXTRA).unwrap(), 2);
        let t = dict.lookup("police officer", Role::Identity, "tiny").await.unwrap();
        assert_eq!(t.term, "police_officer");
        assert_eq!(dict.entries(Role::Setting, "tiny").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tiny.yaml"), EXTRA).unwrap();
        std::fs::write(dir.path().join("broken.yaml"), "name: [unclosed").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let mut dict = InMemoryDictionary::new();
        assert_eq!(dict.load_directory(dir.path()).unwrap(), 2);
        assert_eq!(dict.dictionaries().await.unwrap(), vec!["tiny".to_string()]);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let mut dict = InMemoryDictionary::new();
        let yaml = "name: bad\nterms:\n  identity:\n    x: [.nan, 0.0, 0.0]\n";
        assert!(dict.load_yaml(yaml).is_err());
        assert!(dict.lexicons.is_empty());
    }
}
