//! Resolved equation tables and the generic monomial evaluator.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::epa::{Dimension, Epa};
use crate::error::{ActError, ActResult};

use super::monomial::{Monomial, Slot, Variable};

/// Input values for one evaluation, keyed by slot.
pub type Bindings = BTreeMap<Slot, Epa>;

/// What an equation table computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Impression,
    Amalgamation,
    Emotion,
}

impl Purpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Impression => "impression",
            Purpose::Amalgamation => "amalgamation",
            Purpose::Emotion => "emotion",
        }
    }
}

/// Gender-of-actor variant of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Lookup key: (dictionary, purpose, optional gender variant).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableKey {
    pub dictionary: String,
    pub purpose: Purpose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl TableKey {
    pub fn new(dictionary: impl Into<String>, purpose: Purpose) -> Self {
        Self {
            dictionary: dictionary.into(),
            purpose,
            gender: None,
        }
    }

    pub fn with_gender(mut self, gender: Option<Gender>) -> Self {
        self.gender = gender;
        self
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dictionary, self.purpose.as_str())?;
        if let Some(g) = self.gender {
            write!(f, "/{}", g.as_str())?;
        }
        Ok(())
    }
}

// ============================================================================
// EquationTable
// ============================================================================

/// A validated, immutable coefficient table.
///
/// Output scalar `i` (outputs in declared order, E/P/A within each slot) is
/// `intercept[i] + Σ_k coefficients[i][k] * terms[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EquationTable {
    pub key: TableKey,
    pub version: String,
    inputs: Vec<Slot>,
    outputs: Vec<Slot>,
    terms: Vec<Monomial>,
    intercept: Vec<f64>,
    coefficients: Vec<Vec<f64>>,
}

impl EquationTable {
    /// Build a table, checking that the schema is self-consistent.
    pub fn new(
        key: TableKey,
        version: impl Into<String>,
        inputs: Vec<Slot>,
        outputs: Vec<Slot>,
        terms: Vec<Monomial>,
        intercept: Vec<f64>,
        coefficients: Vec<Vec<f64>>,
    ) -> ActResult<Self> {
        if inputs.is_empty() || outputs.is_empty() {
            return Err(ActError::config(format!(
                "table {} must declare inputs and outputs",
                key
            )));
        }
        let n_out = outputs.len() * 3;
        if intercept.len() != n_out || coefficients.len() != n_out {
            return Err(ActError::config(format!(
                "table {} needs {} output rows, got intercept {} / rows {}",
                key,
                n_out,
                intercept.len(),
                coefficients.len()
            )));
        }
        if let Some(row) = coefficients.iter().find(|r| r.len() != terms.len()) {
            return Err(ActError::config(format!(
                "table {} row has {} coefficients for {} terms",
                key,
                row.len(),
                terms.len()
            )));
        }
        for term in &terms {
            if let Some(v) = term.factors().iter().find(|v| !inputs.contains(&v.slot)) {
                return Err(ActError::config(format!(
                    "table {} term '{}' reads undeclared slot '{}'",
                    key, term, v.slot
                )));
            }
        }
        for (i, t) in terms.iter().enumerate() {
            if terms[..i].contains(t) {
                return Err(ActError::config(format!(
                    "table {} declares term '{}' twice",
                    key, t
                )));
            }
        }
        Ok(Self {
            key,
            version: version.into(),
            inputs,
            outputs,
            terms,
            intercept,
            coefficients,
        })
    }

    pub fn inputs(&self) -> &[Slot] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Slot] {
        &self.outputs
    }

    pub fn terms(&self) -> &[Monomial] {
        &self.terms
    }

    pub fn takes(&self, slot: Slot) -> bool {
        self.inputs.contains(&slot)
    }

    /// Output variables in row order.
    pub fn output_variables(&self) -> Vec<Variable> {
        self.outputs
            .iter()
            .flat_map(|s| Dimension::ALL.into_iter().map(move |d| Variable::new(*s, d)))
            .collect()
    }

    /// Coefficient of `term` in the row for `output`, or 0 when absent.
    pub fn coefficient(&self, output: Variable, term: &Monomial) -> f64 {
        let row = self.output_variables().iter().position(|v| *v == output);
        let col = self.terms.iter().position(|t| t == term);
        match (row, col) {
            (Some(r), Some(c)) => self.coefficients[r][c],
            _ => 0.0,
        }
    }

    /// True when no term multiplies two variables of `slot` together.
    pub fn is_affine_in(&self, slot: Slot) -> bool {
        self.terms.iter().all(|t| t.degree_in(slot) <= 1)
    }

    /// Check that every declared input slot is bound.
    pub fn check_bindings(&self, bindings: &Bindings) -> ActResult<()> {
        match self.inputs.iter().find(|s| !bindings.contains_key(s)) {
            Some(missing) => Err(ActError::invalid(format!(
                "table {} expects '{}' but it is absent",
                self.key, missing
            ))),
            None => Ok(()),
        }
    }

    /// Evaluate every output scalar in row order.
    pub fn evaluate_scalars(&self, bindings: &Bindings) -> ActResult<Vec<f64>> {
        self.check_bindings(bindings)?;
        let values: Vec<f64> = self
            .terms
            .iter()
            .map(|t| t.eval(|v| bindings.get(&v.slot).map_or(0.0, |epa| epa[v.dim])))
            .collect();
        Ok(self
            .coefficients
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| b + row.iter().zip(&values).map(|(c, m)| c * m).sum::<f64>())
            .collect())
    }

    /// Evaluate and regroup the scalars into one triple per output slot.
    pub fn evaluate(&self, bindings: &Bindings) -> ActResult<Vec<(Slot, Epa)>> {
        let scalars = self.evaluate_scalars(bindings)?;
        Ok(self
            .outputs
            .iter()
            .zip(scalars.chunks(3))
            .map(|(slot, c)| (*slot, Epa::new(c[0], c[1], c[2])))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(s: &str) -> Monomial {
        s.parse().unwrap()
    }

    fn tiny_table() -> EquationTable {
        // identity.x' = 0.1 + 0.5 * modifier.x + 0.5 * identity.x, plus one interaction on E
        let terms = vec![
            var("modifier.e"),
            var("modifier.p"),
            var("modifier.a"),
            var("identity.e"),
            var("identity.p"),
            var("identity.a"),
            var("modifier.e*identity.e"),
        ];
        let rows = vec![
            vec![0.5, 0.0, 0.0, 0.5, 0.0, 0.0, 0.2],
            vec![0.0, 0.5, 0.0, 0.0, 0.5, 0.0, 0.0],
            vec![0.0, 0.0, 0.5, 0.0, 0.0, 0.5, 0.0],
        ];
        EquationTable::new(
            TableKey::new("test", Purpose::Amalgamation),
            "1",
            vec![Slot::Modifier, Slot::Identity],
            vec![Slot::Identity],
            terms,
            vec![0.1, 0.1, 0.1],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn test_evaluate_linear_and_interaction() {
        let table = tiny_table();
        let mut b = Bindings::new();
        b.insert(Slot::Modifier, Epa::new(2.0, 1.0, 0.0));
        b.insert(Slot::Identity, Epa::new(1.0, 1.0, 2.0));
        let out = table.evaluate(&b).unwrap();
        assert_eq!(out.len(), 1);
        let (slot, epa) = out[0];
        assert_eq!(slot, Slot::Identity);
        assert!((epa.e - (0.1 + 1.0 + 0.5 + 0.4)).abs() < 1e-12);
        assert!((epa.p - 1.1).abs() < 1e-12);
        assert!((epa.a - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_missing_binding_is_invalid_input() {
        let table = tiny_table();
        let mut b = Bindings::new();
        b.insert(Slot::Modifier, Epa::NEUTRAL);
        assert!(matches!(
            table.evaluate(&b),
            Err(ActError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_undeclared_slot_and_bad_shape() {
        let bad_term = EquationTable::new(
            TableKey::new("test", Purpose::Amalgamation),
            "1",
            vec![Slot::Modifier],
            vec![Slot::Identity],
            vec![var("identity.e")],
            vec![0.0; 3],
            vec![vec![0.0]; 3],
        );
        assert!(matches!(bad_term, Err(ActError::Config(_))));

        let bad_rows = EquationTable::new(
            TableKey::new("test", Purpose::Amalgamation),
            "1",
            vec![Slot::Modifier],
            vec![Slot::Identity],
            vec![var("modifier.e")],
            vec![0.0; 3],
            vec![vec![0.0]; 2],
        );
        assert!(bad_rows.is_err());
    }

    #[test]
    fn test_affinity_and_coefficient_lookup() {
        let table = tiny_table();
        assert!(table.is_affine_in(Slot::Identity));
        let out: Variable = "identity.e".parse().unwrap();
        assert_eq!(table.coefficient(out, &var("identity.e*modifier.e")), 0.2);
        assert_eq!(table.coefficient(out, &var("modifier.p")), 0.0);
    }

    #[test]
    fn test_key_display() {
        let key = TableKey::new("us_2015", Purpose::Impression).with_gender(Some(Gender::Female));
        assert_eq!(key.to_string(), "us_2015/impression/female");
    }
}
