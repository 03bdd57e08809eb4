//! Equation set definitions, the YAML schema for coefficient data.
//!
//! An `EquationSetDef` is pure data for one dictionary. The
//! [`super::registry::EquationRegistry`] resolves it into validated
//! [`EquationTable`]s.
//!
//! # Example YAML
//!
//! ```yaml
//! dictionary: us_2015
//! version: "2015.1"
//! weights:
//!   actor: [1.0, 1.0, 1.0]
//! tables:
//!   - purpose: amalgamation
//!     inputs: [modifier, identity]
//!     outputs: [identity]
//!     terms: [modifier.e, identity.e, "modifier.e*identity.e"]
//!     intercept: { identity.e: -0.05 }
//!     rows:
//!       identity.e: { modifier.e: 0.6, identity.e: 0.45 }
//!       identity.p: { identity.p: 0.6 }
//!       identity.a: { identity.a: 0.5 }
//! ```
//!
//! Every output variable needs a row or an intercept entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::compute::deflection::DeflectionWeights;
use crate::error::{ActError, ActResult};

use super::monomial::{Monomial, Slot, Variable};
use super::table::{EquationTable, Gender, Purpose, TableKey};

/// All tables and weights belonging to one dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationSetDef {
    pub dictionary: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weights: Option<DeflectionWeights>,
    #[serde(default)]
    pub tables: Vec<EquationTableDef>,
}

fn default_version() -> String {
    "1".to_string()
}

/// One table in sparse form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationTableDef {
    pub purpose: Purpose,
    #[serde(default)]
    pub gender: Option<Gender>,
    pub inputs: Vec<Slot>,
    pub outputs: Vec<Slot>,
    /// Declared monomial schema, in column order.
    pub terms: Vec<Monomial>,
    /// Intercept per output variable; absent means 0.
    #[serde(default)]
    pub intercept: BTreeMap<String, f64>,
    /// Sparse rows: output variable -> (term -> coefficient).
    #[serde(default)]
    pub rows: BTreeMap<String, BTreeMap<String, f64>>,
}

impl EquationSetDef {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_yaml_file(path: &str) -> ActResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }

    /// Resolve every table definition into a validated table.
    pub fn resolve(&self) -> ActResult<Vec<EquationTable>> {
        self.tables
            .iter()
            .map(|t| t.resolve(&self.dictionary, &self.version))
            .collect()
    }
}

impl EquationTableDef {
    /// Densify the sparse rows against the declared terms.
    pub fn resolve(&self, dictionary: &str, version: &str) -> ActResult<EquationTable> {
        let key = TableKey::new(dictionary, self.purpose).with_gender(self.gender);
        let outputs: Vec<Variable> = self
            .outputs
            .iter()
            .flat_map(|s| {
                crate::epa::Dimension::ALL
                    .into_iter()
                    .map(move |d| Variable::new(*s, d))
            })
            .collect();

        let mut defined = Vec::with_capacity(outputs.len());
        for name in self.intercept.keys().chain(self.rows.keys()) {
            let var: Variable = name.parse()?;
            if !outputs.contains(&var) {
                return Err(ActError::config(format!(
                    "table {} has a row for '{}' which is not an output",
                    key, name
                )));
            }
            defined.push(var);
        }
        let missing: Vec<String> = outputs
            .iter()
            .filter(|v| !defined.contains(v))
            .map(|v| v.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ActError::config(format!(
                "table {} has no row for output {}",
                key,
                missing.join(", ")
            )));
        }

        let mut intercept = vec![0.0; outputs.len()];
        let mut coefficients = vec![vec![0.0; self.terms.len()]; outputs.len()];
        for (name, value) in &self.intercept {
            let var: Variable = name.parse()?;
            if let Some(i) = outputs.iter().position(|v| *v == var) {
                intercept[i] = *value;
            }
        }
        for (name, row) in &self.rows {
            let var: Variable = name.parse()?;
            let Some(i) = outputs.iter().position(|v| *v == var) else {
                continue;
            };
            for (term, coef) in row {
                let term: Monomial = term.parse()?;
                let col = self.terms.iter().position(|t| *t == term).ok_or_else(|| {
                    ActError::config(format!(
                        "table {} row '{}' uses undeclared term '{}'",
                        key, name, term
                    ))
                })?;
                coefficients[i][col] = *coef;
            }
        }

        EquationTable::new(
            key,
            version,
            self.inputs.clone(),
            self.outputs.clone(),
            self.terms.clone(),
            intercept,
            coefficients,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
dictionary: test
version: "0.1"
tables:
  - purpose: amalgamation
    inputs: [modifier, identity]
    outputs: [identity]
    terms: [modifier.e, identity.e, "identity.e*modifier.e"]
    intercept: { identity.e: -0.05 }
    rows:
      identity.e: { modifier.e: 0.6, identity.e: 0.45, "modifier.e*identity.e": 0.05 }
      identity.p: { identity.e: 0.1 }
      identity.a: { modifier.e: 0.2 }
"#;

    #[test]
    fn test_resolve_sparse_rows() {
        let def = EquationSetDef::from_yaml(YAML).unwrap();
        let tables = def.resolve().unwrap();
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.key, TableKey::new("test", Purpose::Amalgamation));
        assert_eq!(table.version, "0.1");
        let out: Variable = "identity.e".parse().unwrap();
        let inter: Monomial = "modifier.e*identity.e".parse().unwrap();
        assert_eq!(table.coefficient(out, &inter), 0.05);
        let p: Variable = "identity.p".parse().unwrap();
        assert_eq!(table.coefficient(p, &"modifier.e".parse().unwrap()), 0.0);
    }

    #[test]
    fn test_undeclared_term_is_config_error() {
        let yaml = YAML.replace("\"modifier.e*identity.e\": 0.05", "modifier.p: 0.1");
        let def = EquationSetDef::from_yaml(&yaml).unwrap();
        assert!(matches!(def.resolve(), Err(ActError::Config(_))));
    }

    #[test]
    fn test_output_without_row_is_config_error() {
        let yaml = YAML.replace("      identity.a: { modifier.e: 0.2 }\n", "");
        let def = EquationSetDef::from_yaml(&yaml).unwrap();
        let err = def.resolve().unwrap_err();
        assert!(matches!(err, ActError::Config(_)));
        assert!(err.to_string().contains("identity.a"));
    }

    #[test]
    fn test_intercept_alone_defines_an_output() {
        let yaml = YAML.replace(
            "intercept: { identity.e: -0.05 }",
            "intercept: { identity.e: -0.05, identity.a: 0.3 }",
        )
        .replace("      identity.a: { modifier.e: 0.2 }\n", "");
        let table = &EquationSetDef::from_yaml(&yaml).unwrap().resolve().unwrap()[0];
        let a: Variable = "identity.a".parse().unwrap();
        assert_eq!(table.coefficient(a, &"modifier.e".parse().unwrap()), 0.0);
    }

    #[test]
    fn test_impression_table_with_single_row_is_rejected() {
        let yaml = r#"
dictionary: sparse
tables:
  - purpose: impression
    inputs: [actor, behavior, object]
    outputs: [actor, behavior, object]
    terms: [actor.e]
    rows:
      actor.e: { actor.e: 1.0 }
"#;
        let def = EquationSetDef::from_yaml(yaml).unwrap();
        assert!(matches!(def.resolve(), Err(ActError::Config(_))));
    }

    #[test]
    fn test_row_for_non_output_is_config_error() {
        let yaml = YAML.replace(
            "intercept: { identity.e: -0.05 }",
            "intercept: { modifier.e: 1.0 }",
        );
        let def = EquationSetDef::from_yaml(&yaml).unwrap();
        assert!(def.resolve().is_err());
    }
}
