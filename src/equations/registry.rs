//! Equation registry — resolved tables keyed by (dictionary, purpose, gender).
//!
//! Tables are loaded once at startup and never mutated afterwards; lookups
//! hand out `Arc`s so evaluations can run concurrently without locking.
//!
//! Sources, in load order:
//! 1. Built-in equation sets compiled into the binary (`data/equations/`)
//! 2. YAML files in a configured data directory
//! 3. Programmatically registered tables

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::compute::deflection::DeflectionWeights;
use crate::error::{ActError, ActResult};

use super::def::EquationSetDef;
use super::table::{EquationTable, Gender, Purpose, TableKey};

/// Built-in equation sets.
const BUILTIN_SETS: &[(&str, &str)] = &[(
    "us_2015",
    include_str!("../../data/equations/us_2015.yaml"),
)];

/// Registry of immutable equation tables and per-dictionary weights.
#[derive(Debug, Default, Clone)]
pub struct EquationRegistry {
    tables: HashMap<TableKey, Arc<EquationTable>>,
    weights: HashMap<String, DeflectionWeights>,
}

impl EquationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in equation sets.
    pub fn builtin() -> ActResult<Self> {
        let mut reg = Self::new();
        for (name, yaml) in BUILTIN_SETS {
            let count = reg.load_yaml(yaml)?;
            log::info!("Loaded {} built-in equation tables for {}", count, name);
        }
        Ok(reg)
    }

    /// Register a table, replacing any table with the same key.
    pub fn register(&mut self, table: EquationTable) {
        self.tables.insert(table.key.clone(), Arc::new(table));
    }

    pub fn set_weights(&mut self, dictionary: &str, weights: DeflectionWeights) -> ActResult<()> {
        weights.validate()?;
        self.weights.insert(dictionary.to_string(), weights);
        Ok(())
    }

    /// Register every table of an equation set. Nothing is registered if any
    /// table fails validation.
    pub fn register_set(&mut self, def: &EquationSetDef) -> ActResult<usize> {
        let tables = def.resolve()?;
        if let Some(w) = def.weights {
            self.set_weights(&def.dictionary, w)?;
        }
        let count = tables.len();
        for table in tables {
            self.register(table);
        }
        Ok(count)
    }

    /// Load an equation set from a YAML string.
    pub fn load_yaml(&mut self, yaml: &str) -> ActResult<usize> {
        let def = EquationSetDef::from_yaml(yaml)?;
        self.register_set(&def)
    }

    /// Load an equation set from a YAML file.
    pub fn load_file(&mut self, path: &str) -> ActResult<usize> {
        let def = EquationSetDef::from_yaml_file(path)?;
        self.register_set(&def)
    }

    /// Load all equation YAML files from a directory.
    ///
    /// Files that fail to parse or validate are logged and skipped.
    pub fn load_directory(&mut self, dir: &Path) -> ActResult<usize> {
        if !dir.exists() {
            return Ok(0);
        }
        let mut count = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml") {
                match self.load_file(path.to_str().unwrap_or_default()) {
                    Ok(n) => count += n,
                    Err(e) => log::warn!("Skipping equation set {:?}: {}", path, e),
                }
            }
        }
        Ok(count)
    }

    /// Resolve a table, preferring the gender variant when one is requested
    /// and falling back to the ungendered table.
    pub fn resolve(
        &self,
        dictionary: &str,
        purpose: Purpose,
        gender: Option<Gender>,
    ) -> ActResult<Arc<EquationTable>> {
        let base = TableKey::new(dictionary, purpose);
        if gender.is_some() {
            if let Some(t) = self.tables.get(&base.clone().with_gender(gender)) {
                return Ok(Arc::clone(t));
            }
        }
        self.tables
            .get(&base)
            .cloned()
            .ok_or_else(|| ActError::MissingTable(base.with_gender(gender).to_string()))
    }

    /// Weights for a dictionary, if any were supplied.
    pub fn weights(&self, dictionary: &str) -> Option<&DeflectionWeights> {
        self.weights.get(dictionary)
    }

    /// Dictionaries that have at least one table, sorted.
    pub fn dictionaries(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().map(|k| k.dictionary.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
