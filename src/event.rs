//! Events: the actor-behavior-object(-setting) snapshot shared by
//! fundamentals and transients.

use serde::{Deserialize, Serialize};

use crate::epa::{Element, Epa};

/// An ACT event.
///
/// The same shape holds fundamentals (culturally expected values) and
/// transients (impressions after the behavior). `object` defaults to the
/// neutral vector when absent from serialized input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub actor: Epa,
    pub behavior: Epa,
    #[serde(default)]
    pub object: Epa,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<Epa>,
}

impl Event {
    pub fn new(actor: Epa, behavior: Epa, object: Epa) -> Self {
        Self {
            actor,
            behavior,
            object,
            setting: None,
        }
    }

    /// An event with no object; the object is neutral.
    pub fn intransitive(actor: Epa, behavior: Epa) -> Self {
        Self::new(actor, behavior, Epa::NEUTRAL)
    }

    pub fn with_setting(mut self, setting: Epa) -> Self {
        self.setting = Some(setting);
        self
    }

    pub fn has_setting(&self) -> bool {
        self.setting.is_some()
    }

    pub fn get(&self, element: Element) -> Option<Epa> {
        match element {
            Element::Actor => Some(self.actor),
            Element::Behavior => Some(self.behavior),
            Element::Object => Some(self.object),
            Element::Setting => self.setting,
        }
    }

    pub fn set(&mut self, element: Element, value: Epa) {
        match element {
            Element::Actor => self.actor = value,
            Element::Behavior => self.behavior = value,
            Element::Object => self.object = value,
            Element::Setting => self.setting = Some(value),
        }
    }

    /// Elements present in this event, in canonical order.
    pub fn elements(&self) -> Vec<Element> {
        Element::ALL
            .into_iter()
            .filter(|el| self.get(*el).is_some())
            .collect()
    }

    /// The 9 (or 12) scalars in canonical order.
    pub fn scalars(&self) -> Vec<f64> {
        self.elements()
            .into_iter()
            .filter_map(|el| self.get(el))
            .flat_map(|v| v.to_array())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_defaults_to_neutral() {
        let ev: Event = serde_json::from_value(serde_json::json!({
            "actor": [2.0, 1.5, 0.5],
            "behavior": [1.0, 1.0, 1.0]
        }))
        .unwrap();
        assert_eq!(ev.object, Epa::NEUTRAL);
        assert!(!ev.has_setting());
    }

    #[test]
    fn test_scalars_include_setting_when_present() {
        let ev = Event::new(Epa::new(1.0, 2.0, 3.0), Epa::new(4.0, 5.0, 6.0), Epa::NEUTRAL);
        assert_eq!(ev.scalars().len(), 9);
        let with_setting = ev.with_setting(Epa::new(7.0, 8.0, 9.0));
        assert_eq!(with_setting.scalars().len(), 12);
        assert_eq!(with_setting.scalars()[9], 7.0);
    }

    #[test]
    fn test_set_replaces_element() {
        let mut ev = Event::intransitive(Epa::NEUTRAL, Epa::NEUTRAL);
        ev.set(Element::Behavior, Epa::new(1.0, 1.0, 1.0));
        ev.set(Element::Setting, Epa::new(0.5, 0.5, 0.5));
        assert_eq!(ev.get(Element::Behavior), Some(Epa::new(1.0, 1.0, 1.0)));
        assert_eq!(ev.elements(), Element::ALL.to_vec());
    }
}
