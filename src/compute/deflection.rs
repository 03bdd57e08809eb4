//! Deflection: the weighted squared distance between fundamentals and
//! transients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::epa::Element;
use crate::error::{ActError, ActResult};
use crate::event::Event;

fn unit() -> [f64; 3] {
    [1.0; 3]
}

/// Diagonal inverse-variance weights per component.
///
/// Missing elements default to 1.0, which makes deflection the plain squared
/// Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeflectionWeights {
    #[serde(default = "unit")]
    pub actor: [f64; 3],
    #[serde(default = "unit")]
    pub behavior: [f64; 3],
    #[serde(default = "unit")]
    pub object: [f64; 3],
    #[serde(default = "unit")]
    pub setting: [f64; 3],
}

impl Default for DeflectionWeights {
    fn default() -> Self {
        Self {
            actor: unit(),
            behavior: unit(),
            object: unit(),
            setting: unit(),
        }
    }
}

impl DeflectionWeights {
    pub fn for_element(&self, element: Element) -> [f64; 3] {
        match element {
            Element::Actor => self.actor,
            Element::Behavior => self.behavior,
            Element::Object => self.object,
            Element::Setting => self.setting,
        }
    }

    /// Weights must be finite and strictly positive so that deflection is zero
    /// exactly when fundamentals equal transients.
    pub fn validate(&self) -> ActResult<()> {
        for element in Element::ALL {
            if self
                .for_element(element)
                .iter()
                .any(|w| !w.is_finite() || *w <= 0.0)
            {
                return Err(ActError::invalid(format!(
                    "deflection weights for {} must be finite and > 0",
                    element
                )));
            }
        }
        Ok(())
    }
}

/// Total deflection and its per-component breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionResult {
    pub total: f64,
    pub by_component: BTreeMap<Element, [f64; 3]>,
}

impl DeflectionResult {
    /// Sum of the breakdown; equals `total` by construction.
    pub fn component_sum(&self) -> f64 {
        self.by_component.values().flatten().sum()
    }
}

/// Weighted squared residuals between `fundamental` and `transient`.
///
/// Both events must agree on whether a setting is present.
pub fn deflection(
    fundamental: &Event,
    transient: &Event,
    weights: Option<&DeflectionWeights>,
) -> ActResult<DeflectionResult> {
    if fundamental.has_setting() != transient.has_setting() {
        return Err(ActError::invalid(
            "fundamental and transient must both have or both lack a setting",
        ));
    }
    let default_weights = DeflectionWeights::default();
    let weights = match weights {
        Some(w) => {
            w.validate()?;
            w
        }
        None => &default_weights,
    };

    let mut by_component = BTreeMap::new();
    for element in fundamental.elements() {
        let (Some(f), Some(t)) = (fundamental.get(element), transient.get(element)) else {
            continue;
        };
        if !f.is_finite() || !t.is_finite() {
            return Err(ActError::invalid(format!(
                "non-finite EPA value for {}",
                element
            )));
        }
        let residual = (t - f).to_array();
        let w = weights.for_element(element);
        by_component.insert(
            element,
            [
                w[0] * residual[0] * residual[0],
                w[1] * residual[1] * residual[1],
                w[2] * residual[2] * residual[2],
            ],
        );
    }
    let total: f64 = by_component.values().flatten().sum();
    log::debug!("deflection total = {:.4}", total);
    Ok(DeflectionResult {
        total,
        by_component,
    })
}
