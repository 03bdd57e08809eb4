//! Modifier + identity amalgamation ("happy" + "doctor" -> "happy doctor").

use crate::epa::Epa;
use crate::equations::{Bindings, EquationTable, Purpose, Slot};
use crate::error::{ActError, ActResult};

/// Combine a modifier with a base identity.
///
/// The table treats its two inputs with different coefficients, so swapping
/// them generally changes the result.
pub fn amalgamate(modifier: Epa, identity: Epa, table: &EquationTable) -> ActResult<Epa> {
    if table.key.purpose != Purpose::Amalgamation {
        return Err(ActError::invalid(format!(
            "table {} is not an amalgamation table",
            table.key
        )));
    }
    let bindings: Bindings = [(Slot::Modifier, modifier), (Slot::Identity, identity)]
        .into_iter()
        .collect();
    let result = table
        .evaluate(&bindings)?
        .into_iter()
        .find_map(|(slot, v)| (slot == Slot::Identity).then_some(v))
        .ok_or_else(|| {
            ActError::config(format!(
                "amalgamation table {} does not produce an identity",
                table.key
            ))
        })?;
    log::debug!("amalgamate {} + {} = {}", modifier, identity, result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::EquationRegistry;
    use std::sync::Arc;

    fn table() -> Arc<EquationTable> {
        EquationRegistry::builtin()
            .unwrap()
            .resolve("us_2015", Purpose::Amalgamation, None)
            .unwrap()
    }

    #[test]
    fn test_happy_doctor() {
        let happy = Epa::new(2.60, 1.60, 1.40);
        let doctor = Epa::new(2.53, 2.35, 0.41);
        let r = amalgamate(happy, doctor, &table()).unwrap();
        let e = -0.05 + 0.60 * 2.60 - 0.05 * 1.60 + 0.45 * 2.53 + 0.05 * 2.60 * 2.53;
        assert!((r.e - e).abs() < 1e-12);
        assert!(r.is_finite());
    }

    #[test]
    fn test_asymmetry_is_preserved() {
        let happy = Epa::new(2.60, 1.60, 1.40);
        let doctor = Epa::new(2.53, 2.35, 0.41);
        let t = table();
        let forward = amalgamate(happy, doctor, &t).unwrap();
        let swapped = amalgamate(doctor, happy, &t).unwrap();
        assert_ne!(forward, swapped);
    }

    #[test]
    fn test_rejects_impression_table() {
        let impression = EquationRegistry::builtin()
            .unwrap()
            .resolve("us_2015", Purpose::Impression, None)
            .unwrap();
        let err = amalgamate(Epa::NEUTRAL, Epa::NEUTRAL, &impression).unwrap_err();
        assert!(matches!(err, ActError::InvalidInput(_)));
    }
}
