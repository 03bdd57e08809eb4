//! Emotion prediction from an identity's fundamental and transient.

use crate::epa::{Element, Epa};
use crate::equations::{Bindings, EquationTable, Purpose, Slot};
use crate::error::{ActError, ActResult};
use crate::event::Event;

/// Predicted emotion of the actor after an event.
pub fn predict_emotion(
    fundamental: &Event,
    transient: &Event,
    table: &EquationTable,
) -> ActResult<Epa> {
    predict_emotion_for(Element::Actor, fundamental, transient, table)
}

/// Predicted emotion of the person occupying `element` (actor or object).
pub fn predict_emotion_for(
    element: Element,
    fundamental: &Event,
    transient: &Event,
    table: &EquationTable,
) -> ActResult<Epa> {
    let (Some(identity), Some(felt)) = (fundamental.get(element), transient.get(element)) else {
        return Err(ActError::invalid(format!(
            "both events need a {} to predict its emotion",
            element
        )));
    };
    emotion_from(identity, felt, table)
}

/// Emotion for an identity fundamental and its current transient.
pub fn emotion_from(identity: Epa, transient: Epa, table: &EquationTable) -> ActResult<Epa> {
    if table.key.purpose != Purpose::Emotion {
        return Err(ActError::invalid(format!(
            "table {} is not an emotion table",
            table.key
        )));
    }
    let bindings: Bindings = [(Slot::Identity, identity), (Slot::Transient, transient)]
        .into_iter()
        .collect();
    let emotion = table
        .evaluate(&bindings)?
        .into_iter()
        .find_map(|(slot, v)| (slot == Slot::Emotion).then_some(v))
        .ok_or_else(|| {
            ActError::config(format!("emotion table {} does not produce an emotion", table.key))
        })?;
    log::debug!("emotion for {} feeling {}: {}", identity, transient, emotion);
    Ok(emotion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::impression::evaluate_impression;
    use crate::equations::EquationRegistry;

    fn registry() -> EquationRegistry {
        EquationRegistry::builtin().unwrap()
    }

    #[test]
    fn test_confirmed_identity_feels_its_own_evaluation() {
        let table = registry().resolve("us_2015", Purpose::Emotion, None).unwrap();
        let doctor = Epa::new(2.53, 2.35, 0.41);
        let ev = Event::new(doctor, Epa::NEUTRAL, Epa::NEUTRAL);
        let e = predict_emotion(&ev, &ev, &table).unwrap();
        let expected_e = -0.45 * 2.53 + 1.20 * 2.53 + 0.03 * 2.53 * 2.53;
        assert!((e.e - expected_e).abs() < 1e-12);
        assert!(e.e > 0.0);
    }

    #[test]
    fn test_victim_of_hit_feels_negative() {
        let reg = registry();
        let impression = reg.resolve("us_2015", Purpose::Impression, None).unwrap();
        let emotion = reg.resolve("us_2015", Purpose::Emotion, None).unwrap();
        let fundamental = Event::new(
            Epa::new(-2.70, 0.90, 1.90),
            Epa::new(-2.10, 1.40, 2.10),
            Epa::new(1.90, -1.40, 2.30),
        );
        let transient = evaluate_impression(&fundamental, &impression).unwrap();
        let felt =
            predict_emotion_for(Element::Object, &fundamental, &transient, &emotion).unwrap();
        assert!(felt.e < 0.0);
    }

    #[test]
    fn test_missing_setting_is_invalid() {
        let table = registry().resolve("us_2015", Purpose::Emotion, None).unwrap();
        let ev = Event::new(Epa::NEUTRAL, Epa::NEUTRAL, Epa::NEUTRAL);
        let err = predict_emotion_for(Element::Setting, &ev, &ev, &table).unwrap_err();
        assert!(matches!(err, ActError::InvalidInput(_)));
    }
}
