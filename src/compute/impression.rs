//! Impression formation: fundamental event -> transient impression.

use crate::epa::Element;
use crate::equations::{Bindings, EquationTable, Purpose, Slot};
use crate::error::{ActError, ActResult};
use crate::event::Event;

/// Bind an event's elements to the matching table slots.
pub fn event_bindings(event: &Event) -> Bindings {
    event
        .elements()
        .into_iter()
        .filter_map(|el| event.get(el).map(|v| (Slot::from(el), v)))
        .collect()
}

/// Compute the transient impression of `event` under an impression table.
///
/// A setting the table does not model is carried through unchanged, so the
/// transient always has the same shape as the fundamental.
pub fn evaluate_impression(event: &Event, table: &EquationTable) -> ActResult<Event> {
    if table.key.purpose != Purpose::Impression {
        return Err(ActError::invalid(format!(
            "table {} is not an impression-formation table",
            table.key
        )));
    }
    let outputs = table.evaluate(&event_bindings(event))?;
    let mut transient = *event;
    let mut written = Vec::with_capacity(outputs.len());
    for (slot, value) in outputs {
        let Some(element) = slot.element() else {
            return Err(ActError::config(format!(
                "impression table {} writes non-event slot '{}'",
                table.key, slot
            )));
        };
        if element == Element::Setting && !event.has_setting() {
            continue;
        }
        transient.set(element, value);
        written.push(element);
    }
    for required in [Element::Actor, Element::Behavior, Element::Object] {
        if !written.contains(&required) {
            return Err(ActError::config(format!(
                "impression table {} does not produce a transient {}",
                table.key, required
            )));
        }
    }
    log::debug!(
        "impression {}: actor {} behavior {} object {}",
        table.key,
        transient.actor,
        transient.behavior,
        transient.object
    );
    Ok(transient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epa::Epa;
    use crate::equations::{EquationRegistry, EquationSetDef};

    const SETTING_SET: &str = r#"
dictionary: settings
tables:
  - purpose: impression
    inputs: [actor, behavior, object, setting]
    outputs: [actor, behavior, object, setting]
    terms:
      - actor.e
      - actor.p
      - actor.a
      - behavior.e
      - behavior.p
      - behavior.a
      - object.e
      - object.p
      - object.a
      - setting.e
      - setting.p
      - setting.a
      - "behavior.e*setting.e"
    rows:
      actor.e: { actor.e: 0.5, behavior.e: 0.4, "behavior.e*setting.e": 0.1 }
      actor.p: { actor.p: 0.6, behavior.p: 0.3 }
      actor.a: { actor.a: 0.6, behavior.a: 0.3, setting.a: 0.1 }
      behavior.e: { behavior.e: 0.6 }
      behavior.p: { behavior.p: 0.6, setting.p: 0.1 }
      behavior.a: { behavior.a: 0.6 }
      object.e: { object.e: 0.5 }
      object.p: { object.p: 0.5, behavior.p: -0.1 }
      object.a: { object.a: 0.5 }
      setting.e: { setting.e: 0.9 }
      setting.p: { setting.p: 0.9 }
      setting.a: { setting.a: 0.9 }
"#;

    fn builtin() -> std::sync::Arc<EquationTable> {
        EquationRegistry::builtin()
            .unwrap()
            .resolve("us_2015", Purpose::Impression, None)
            .unwrap()
    }

    #[test]
    fn test_transient_is_finite_three_vectors() {
        let table = builtin();
        let doctor = Epa::new(2.53, 2.35, 0.41);
        let help = Epa::new(2.55, 1.85, 0.35);
        let patient = Epa::new(0.95, -0.98, -0.90);
        let t = evaluate_impression(&Event::new(doctor, help, patient), &table).unwrap();
        assert!(t.actor.is_finite() && t.behavior.is_finite() && t.object.is_finite());
        assert!(t.setting.is_none());
        // Good behavior toward someone keeps the actor positive.
        assert!(t.actor.e > 0.0);
    }

    #[test]
    fn test_matches_hand_computed_actor_potency() {
        let table = builtin();
        let ev = Event::new(
            Epa::new(1.0, 2.0, 0.0),
            Epa::new(0.0, 1.0, 0.0),
            Epa::new(0.0, 0.0, 0.0),
        );
        let t = evaluate_impression(&ev, &table).unwrap();
        // -0.05 + 0.55*Ap + 0.55*Bp + 0.05*Ap*Bp
        let expected = -0.05 + 0.55 * 2.0 + 0.55 * 1.0 + 0.05 * 2.0;
        assert!((t.actor.p - expected).abs() < 1e-12);
    }

    #[test]
    fn test_setting_required_when_table_declares_it() {
        let def = EquationSetDef::from_yaml(SETTING_SET).unwrap();
        let table = def.resolve().unwrap().remove(0);
        let ev = Event::new(Epa::new(1.0, 0.0, 0.0), Epa::new(1.0, 0.0, 0.0), Epa::NEUTRAL);
        assert!(matches!(
            evaluate_impression(&ev, &table),
            Err(ActError::InvalidInput(_))
        ));
        let t = evaluate_impression(&ev.with_setting(Epa::new(2.0, 0.0, 0.0)), &table).unwrap();
        assert!((t.actor.e - (0.5 + 0.4 + 0.2)).abs() < 1e-12);
        assert_eq!(t.setting, Some(Epa::new(1.8, 0.0, 0.0)));
    }

    #[test]
    fn test_unmodelled_setting_is_carried_through() {
        let table = builtin();
        let school = Epa::new(1.4, 1.4, 1.5);
        let ev = Event::new(Epa::new(1.0, 1.0, 1.0), Epa::new(1.0, 1.0, 1.0), Epa::NEUTRAL)
            .with_setting(school);
        let t = evaluate_impression(&ev, &table).unwrap();
        assert_eq!(t.setting, Some(school));
    }

    #[test]
    fn test_rejects_wrong_purpose() {
        let reg = EquationRegistry::builtin().unwrap();
        let amalg = reg.resolve("us_2015", Purpose::Amalgamation, None).unwrap();
        let ev = Event::new(Epa::NEUTRAL, Epa::NEUTRAL, Epa::NEUTRAL);
        assert!(evaluate_impression(&ev, &amalg).is_err());
    }
}
