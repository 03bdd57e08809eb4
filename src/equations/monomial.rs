//! Equation variables and monomials.
//!
//! A variable names one scalar of one EPA triple (`actor.e`, `modifier.p`).
//! A monomial is a product of variables written `*`-joined
//! (`actor.e*behavior.e`). Factor order is normalised so that
//! `behavior.e*actor.e` and `actor.e*behavior.e` are the same term.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::epa::{Dimension, Element};
use crate::error::ActError;

// ============================================================================
// Slot
// ============================================================================

/// A named EPA triple an equation table reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Actor,
    Behavior,
    Object,
    Setting,
    Modifier,
    Identity,
    Transient,
    Emotion,
}

impl Slot {
    pub const ALL: [Slot; 8] = [
        Slot::Actor,
        Slot::Behavior,
        Slot::Object,
        Slot::Setting,
        Slot::Modifier,
        Slot::Identity,
        Slot::Transient,
        Slot::Emotion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Actor => "actor",
            Slot::Behavior => "behavior",
            Slot::Object => "object",
            Slot::Setting => "setting",
            Slot::Modifier => "modifier",
            Slot::Identity => "identity",
            Slot::Transient => "transient",
            Slot::Emotion => "emotion",
        }
    }

    /// The event element this slot stands for, if any.
    pub fn element(self) -> Option<Element> {
        match self {
            Slot::Actor => Some(Element::Actor),
            Slot::Behavior => Some(Element::Behavior),
            Slot::Object => Some(Element::Object),
            Slot::Setting => Some(Element::Setting),
            _ => None,
        }
    }
}

impl From<Element> for Slot {
    fn from(element: Element) -> Self {
        match element {
            Element::Actor => Slot::Actor,
            Element::Behavior => Slot::Behavior,
            Element::Object => Slot::Object,
            Element::Setting => Slot::Setting,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = ActError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ActError::config(format!("unknown slot '{}'", s)))
    }
}

// ============================================================================
// Variable
// ============================================================================

/// One scalar input or output: a slot plus a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    pub slot: Slot,
    pub dim: Dimension,
}

impl Variable {
    pub fn new(slot: Slot, dim: Dimension) -> Self {
        Self { slot, dim }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.slot, self.dim.as_str())
    }
}

impl FromStr for Variable {
    type Err = ActError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (slot, dim) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| ActError::config(format!("variable '{}' is not 'slot.dim'", s)))?;
        let dim = Dimension::parse(dim)
            .ok_or_else(|| ActError::config(format!("unknown dimension in '{}'", s)))?;
        Ok(Variable::new(slot.parse()?, dim))
    }
}

// ============================================================================
// Monomial
// ============================================================================

/// A product of one or more variables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Monomial {
    factors: Vec<Variable>,
}

impl Monomial {
    pub fn new(mut factors: Vec<Variable>) -> Result<Self, ActError> {
        if factors.is_empty() {
            return Err(ActError::config("monomial must have at least one factor"));
        }
        factors.sort();
        Ok(Self { factors })
    }

    pub fn linear(var: Variable) -> Self {
        Self { factors: vec![var] }
    }

    pub fn factors(&self) -> &[Variable] {
        &self.factors
    }

    pub fn degree(&self) -> usize {
        self.factors.len()
    }

    /// How many factors come from `slot`.
    pub fn degree_in(&self, slot: Slot) -> usize {
        self.factors.iter().filter(|v| v.slot == slot).count()
    }

    /// Evaluate with a per-variable value source.
    pub fn eval(&self, value: impl Fn(Variable) -> f64) -> f64 {
        self.factors.iter().map(|v| value(*v)).product()
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.factors.iter().map(|v| v.to_string()).collect();
        f.write_str(&parts.join("*"))
    }
}

impl FromStr for Monomial {
    type Err = ActError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let factors = s
            .split('*')
            .map(str::parse)
            .collect::<Result<Vec<Variable>, _>>()?;
        Monomial::new(factors)
    }
}

impl TryFrom<String> for Monomial {
    type Error = ActError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Monomial> for String {
    fn from(m: Monomial) -> Self {
        m.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_normalise() {
        let a: Monomial = "behavior.e*actor.e".parse().unwrap();
        let b: Monomial = "actor.e*behavior.e".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "actor.e*behavior.e");
        assert_eq!(a.degree(), 2);
        assert_eq!(a.degree_in(Slot::Actor), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("actor".parse::<Monomial>().is_err());
        assert!("actor.x".parse::<Monomial>().is_err());
        assert!("villain.e".parse::<Monomial>().is_err());
        assert!("".parse::<Monomial>().is_err());
    }

    #[test]
    fn test_eval_multiplies_factors() {
        let m: Monomial = "actor.e*object.p".parse().unwrap();
        let v = m.eval(|var| match (var.slot, var.dim) {
            (Slot::Actor, Dimension::E) => 2.0,
            (Slot::Object, Dimension::P) => -1.5,
            _ => 0.0,
        });
        assert_eq!(v, -3.0);
    }
}
