//! The affective space: EPA triples and the names used to address them.

use std::fmt;
use std::ops::{Add, Index, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{ActError, ActResult};

/// Instrument scale limit for each EPA component.
pub const SCALE_LIMIT: f64 = 4.3;

// ============================================================================
// Epa
// ============================================================================

/// A point in Evaluation-Potency-Activity space.
///
/// Serialized as a plain `[e, p, a]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Epa {
    pub e: f64,
    pub p: f64,
    pub a: f64,
}

impl Epa {
    /// The neutral point, used for an absent object.
    pub const NEUTRAL: Epa = Epa::new(0.0, 0.0, 0.0);

    pub const fn new(e: f64, p: f64, a: f64) -> Self {
        Self { e, p, a }
    }

    /// Build from a slice, rejecting anything that is not exactly 3 long.
    pub fn from_slice(values: &[f64]) -> ActResult<Self> {
        match values {
            [e, p, a] => Ok(Self::new(*e, *p, *a)),
            other => Err(ActError::invalid(format!(
                "EPA vector must have exactly 3 components, got {}",
                other.len()
            ))),
        }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.e, self.p, self.a]
    }

    pub fn get(&self, dim: Dimension) -> f64 {
        match dim {
            Dimension::E => self.e,
            Dimension::P => self.p,
            Dimension::A => self.a,
        }
    }

    pub fn squared_distance(&self, other: &Epa) -> f64 {
        let d = *self - *other;
        d.e * d.e + d.p * d.p + d.a * d.a
    }

    /// Unweighted Euclidean distance.
    pub fn distance(&self, other: &Epa) -> f64 {
        self.squared_distance(other).sqrt()
    }

    /// True when any component lies outside `[-4.3, 4.3]`.
    ///
    /// Out-of-range values are flagged, never rejected.
    pub fn is_out_of_range(&self) -> bool {
        self.to_array().iter().any(|v| v.abs() > SCALE_LIMIT)
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl From<[f64; 3]> for Epa {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Epa> for [f64; 3] {
    fn from(v: Epa) -> Self {
        v.to_array()
    }
}

impl Sub for Epa {
    type Output = Epa;

    fn sub(self, rhs: Epa) -> Epa {
        Epa::new(self.e - rhs.e, self.p - rhs.p, self.a - rhs.a)
    }
}

impl Add for Epa {
    type Output = Epa;

    fn add(self, rhs: Epa) -> Epa {
        Epa::new(self.e + rhs.e, self.p + rhs.p, self.a + rhs.a)
    }
}

impl Mul<f64> for Epa {
    type Output = Epa;

    fn mul(self, rhs: f64) -> Epa {
        Epa::new(self.e * rhs, self.p * rhs, self.a * rhs)
    }
}

impl Index<Dimension> for Epa {
    type Output = f64;

    fn index(&self, dim: Dimension) -> &f64 {
        match dim {
            Dimension::E => &self.e,
            Dimension::P => &self.p,
            Dimension::A => &self.a,
        }
    }
}

impl fmt::Display for Epa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {:.2}, {:.2}]", self.e, self.p, self.a)
    }
}

// ============================================================================
// Dimension
// ============================================================================

/// One axis of the affective space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    E,
    P,
    A,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::E, Dimension::P, Dimension::A];

    pub fn index(self) -> usize {
        match self {
            Dimension::E => 0,
            Dimension::P => 1,
            Dimension::A => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::E => "e",
            Dimension::P => "p",
            Dimension::A => "a",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "e" => Some(Dimension::E),
            "p" => Some(Dimension::P),
            "a" => Some(Dimension::A),
            _ => None,
        }
    }
}

// ============================================================================
// Role
// ============================================================================

/// Dictionary partition a label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Identity,
    Behavior,
    Modifier,
    Setting,
    Emotion,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Identity,
        Role::Behavior,
        Role::Modifier,
        Role::Setting,
        Role::Emotion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Identity => "identity",
            Role::Behavior => "behavior",
            Role::Modifier => "modifier",
            Role::Setting => "setting",
            Role::Emotion => "emotion",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ActError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ActError::invalid(format!("unknown role '{}'", s)))
    }
}

// ============================================================================
// Element
// ============================================================================

/// A position in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Actor,
    Behavior,
    Object,
    Setting,
}

impl Element {
    pub const ALL: [Element; 4] = [
        Element::Actor,
        Element::Behavior,
        Element::Object,
        Element::Setting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Element::Actor => "actor",
            Element::Behavior => "behavior",
            Element::Object => "object",
            Element::Setting => "setting",
        }
    }

    /// The dictionary partition labels for this element come from.
    pub fn role(self) -> Role {
        match self {
            Element::Actor | Element::Object => Role::Identity,
            Element::Behavior => Role::Behavior,
            Element::Setting => Role::Setting,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_distance_and_distance() {
        let a = Epa::new(1.0, 2.0, 2.0);
        assert_eq!(a.squared_distance(&Epa::NEUTRAL), 9.0);
        assert_eq!(a.distance(&Epa::NEUTRAL), 3.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_from_slice_rejects_wrong_arity() {
        assert!(Epa::from_slice(&[1.0, 2.0, 3.0]).is_ok());
        let err = Epa::from_slice(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ActError::InvalidInput(_)));
        assert!(Epa::from_slice(&[1.0, 2.0, 3.0, 4.0]).is_err());
    }

    #[test]
    fn test_out_of_range_is_flagged_not_rejected() {
        let v = Epa::new(4.5, 0.0, -1.0);
        assert!(v.is_out_of_range());
        assert!(!Epa::new(4.3, -4.3, 0.0).is_out_of_range());
    }

    #[test]
    fn test_serializes_as_array() {
        let v = Epa::new(2.5, 1.0, -0.5);
        let json = serde_json::to_value(v).unwrap();
        assert_eq!(json, serde_json::json!([2.5, 1.0, -0.5]));
        let back: Epa = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
        assert!(serde_json::from_value::<Epa>(serde_json::json!([1.0, 2.0])).is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Behavior".parse::<Role>().unwrap(), Role::Behavior);
        assert!("verb".parse::<Role>().is_err());
        assert_eq!(Element::Object.role(), Role::Identity);
    }
}
