//! Pure ACT computations over EPA vectors, events and equation tables.
//!
//! Nothing here performs I/O or holds state; every function may be called
//! concurrently against shared `Arc<EquationTable>`s.

pub mod amalgamate;
pub mod closest;
pub mod deflection;
pub mod emotion;
pub mod impression;
pub mod solver;

pub use amalgamate::amalgamate;
pub use closest::{closest_terms, ClosestMatch};
pub use deflection::{deflection, DeflectionResult, DeflectionWeights};
pub use emotion::{emotion_from, predict_emotion, predict_emotion_for};
pub use impression::{evaluate_impression, event_bindings};
pub use solver::{event_deflection, optimal_behavior, solve_for_role};
