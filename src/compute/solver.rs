//! Deflection-minimising solver for one free event element.
//!
//! With every other element fixed, each transient scalar is affine in the
//! free element's three unknowns `y` (the table may not multiply two of them
//! together), so the residual vector is `r(y) = a + M y` and deflection is the
//! quadratic form `Σ w_i r_i²`. Its minimum solves the 3x3 normal equations
//! `(MᵀWM) y = −MᵀW a`.

use crate::epa::{Element, Epa};
use crate::equations::{EquationTable, Purpose, Slot};
use crate::error::{ActError, ActResult};
use crate::event::Event;

use super::deflection::{deflection, DeflectionWeights};
use super::impression::{evaluate_impression, event_bindings};

/// Pivots smaller than this (relative to the largest entry) are singular.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Find the EPA for `element` that minimises the deflection of `event`.
///
/// The value `event` carries for `element` is ignored.
pub fn solve_for_role(
    event: &Event,
    element: Element,
    table: &EquationTable,
    weights: Option<&DeflectionWeights>,
) -> ActResult<Epa> {
    if table.key.purpose != Purpose::Impression {
        return Err(ActError::invalid(format!(
            "table {} is not an impression-formation table",
            table.key
        )));
    }
    let free = Slot::from(element);
    if !table.takes(free) {
        return Err(ActError::invalid(format!(
            "table {} does not model the {}",
            table.key, element
        )));
    }
    if !table.is_affine_in(free) {
        return Err(ActError::invalid(format!(
            "table {} is not quadratic-solvable in the {}",
            table.key, element
        )));
    }
    let default_weights = DeflectionWeights::default();
    let weights = match weights {
        Some(w) => {
            w.validate()?;
            w
        }
        None => &default_weights,
    };

    // Affine decomposition f(y) = f0 + D y, read off by evaluation.
    let mut bindings = event_bindings(event);
    bindings.insert(free, Epa::NEUTRAL);
    let f0 = table.evaluate_scalars(&bindings)?;
    let mut columns = Vec::with_capacity(3);
    for unit in [Epa::new(1.0, 0.0, 0.0), Epa::new(0.0, 1.0, 0.0), Epa::new(0.0, 0.0, 1.0)] {
        bindings.insert(free, unit);
        let fj = table.evaluate_scalars(&bindings)?;
        columns.push(fj.iter().zip(&f0).map(|(x, b)| x - b).collect::<Vec<f64>>());
    }

    let mut normal = [[0.0; 3]; 3];
    let mut rhs = [0.0; 3];
    for (i, var) in table.output_variables().into_iter().enumerate() {
        let Some(out_element) = var.slot.element() else {
            return Err(ActError::config(format!(
                "impression table {} writes non-event slot '{}'",
                table.key, var.slot
            )));
        };
        let d = var.dim.index();
        // Fundamental side of the residual: y itself for the free element.
        let (fixed, selector) = if out_element == element {
            (0.0, Some(d))
        } else {
            match event.get(out_element) {
                Some(v) => (v.to_array()[d], None),
                None => continue,
            }
        };
        let a = f0[i] - fixed;
        let mut m = [columns[0][i], columns[1][i], columns[2][i]];
        if let Some(j) = selector {
            m[j] -= 1.0;
        }
        let w = weights.for_element(out_element)[d];
        for r in 0..3 {
            for c in 0..3 {
                normal[r][c] += w * m[r] * m[c];
            }
            rhs[r] -= w * m[r] * a;
        }
    }

    let y = solve3(normal, rhs).ok_or_else(|| {
        ActError::SingularSystem(format!(
            "no unique optimum for the {} under table {}",
            element, table.key
        ))
    })?;
    let solution = Epa::from(y);
    log::debug!("solved {} = {} under {}", element, solution, table.key);
    Ok(solution)
}

/// The behavior that best confirms `actor` acting on `object`.
pub fn optimal_behavior(
    actor: Epa,
    object: Epa,
    setting: Option<Epa>,
    table: &EquationTable,
    weights: Option<&DeflectionWeights>,
) -> ActResult<Epa> {
    let mut event = Event::new(actor, Epa::NEUTRAL, object);
    event.setting = setting;
    solve_for_role(&event, Element::Behavior, table, weights)
}

/// Deflection produced by enacting `event` as a fundamental.
pub fn event_deflection(
    event: &Event,
    table: &EquationTable,
    weights: Option<&DeflectionWeights>,
) -> ActResult<f64> {
    let transient = evaluate_impression(event, table)?;
    Ok(deflection(event, &transient, weights)?.total)
}

/// Solve a 3x3 system by Gaussian elimination with partial pivoting.
///
/// Returns `None` when the matrix is singular to working precision.
pub fn solve3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    let scale = a
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    let tol = PIVOT_TOLERANCE * scale;

    for col in 0..3 {
        let pivot = (col..3)
            .max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < tol {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in (col + 1)..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; 3];
    for row in (0..3).rev() {
        let tail: f64 = ((row + 1)..3).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
