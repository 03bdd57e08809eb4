//! Nearest-term search over a dictionary partition.

use serde::{Deserialize, Serialize};

use crate::dictionary::Term;
use crate::epa::Epa;
use crate::error::{ActError, ActResult};

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosestMatch {
    pub label: String,
    pub epa: Epa,
    pub distance: f64,
}

/// The `n` entries nearest to `epa` by unweighted Euclidean distance.
///
/// Ordered by distance, ties by label. `n` larger than the partition returns
/// every entry.
pub fn closest_terms(entries: &[Term], epa: Epa, n: usize) -> ActResult<Vec<ClosestMatch>> {
    if n < 1 {
        return Err(ActError::invalid("n must be at least 1"));
    }
    if !epa.is_finite() {
        return Err(ActError::invalid(format!("query {} is not finite", epa)));
    }
    let mut ranked: Vec<ClosestMatch> = entries
        .iter()
        .map(|t| ClosestMatch {
            label: t.term.clone(),
            epa: t.epa,
            distance: epa.distance(&t.epa),
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.label.cmp(&b.label))
    });
    ranked.truncate(n);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epa::Role;
    use proptest::prelude::*;

    fn term(label: &str, e: f64, p: f64, a: f64) -> Term {
        Term::new(label, Role::Identity, Epa::new(e, p, a), "test")
    }

    #[test]
    fn test_exact_match_first_and_ties_lexical() {
        let entries = vec![
            term("zeta", 1.0, 0.0, 0.0),
            term("alpha", 1.0, 0.0, 0.0),
            term("exact", 0.0, 0.0, 0.0),
            term("far", 3.0, 3.0, 3.0),
        ];
        let hits = closest_terms(&entries, Epa::NEUTRAL, 3).unwrap();
        let labels: Vec<&str> = hits.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["exact", "alpha", "zeta"]);
        assert_eq!(hits[0].distance, 0.0);
    }

    #[test]
    fn test_n_larger_than_partition() {
        let entries = vec![term("a", 0.0, 0.0, 0.0), term("b", 1.0, 1.0, 1.0)];
        assert_eq!(closest_terms(&entries, Epa::NEUTRAL, 10).unwrap().len(), 2);
        assert!(closest_terms(&[], Epa::NEUTRAL, 1).unwrap().is_empty());
    }

    #[test]
    fn test_n_zero_is_invalid() {
        let err = closest_terms(&[], Epa::NEUTRAL, 0).unwrap_err();
        assert!(matches!(err, ActError::InvalidInput(_)));
    }

    proptest! {
        #[test]
        fn prop_distances_non_decreasing(
            points in prop::collection::vec((-4.3f64..4.3, -4.3f64..4.3, -4.3f64..4.3), 1..30),
            q in (-4.3f64..4.3, -4.3f64..4.3, -4.3f64..4.3),
            n in 1usize..40,
        ) {
            let entries: Vec<Term> = points
                .iter()
                .enumerate()
                .map(|(i, (e, p, a))| term(&format!("t{:02}", i), *e, *p, *a))
                .collect();
            let query = Epa::new(q.0, q.1, q.2);
            let hits = closest_terms(&entries, query, n).unwrap();
            prop_assert_eq!(hits.len(), n.min(entries.len()));
            prop_assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
            // Restartable: the same query yields the same ordering.
            prop_assert_eq!(hits, closest_terms(&entries, query, n).unwrap());
        }
    }
}
