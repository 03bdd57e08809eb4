//! Equation tables — versioned coefficients for the model's equations.
//!
//! # Architecture
//!
//! ```text
//! YAML (built-in or ACT_DATA_DIR)
//!   ↓  EquationSetDef::from_yaml()
//! EquationTableDef (sparse rows)
//!   ↓  EquationTableDef::resolve()
//! EquationTable (dense, validated, immutable)
//!   ↓  EquationRegistry::resolve(dictionary, purpose, gender)
//! Arc<EquationTable> handed to the evaluators
//! ```

pub mod def;
pub mod monomial;
pub mod registry;
pub mod table;

pub use def::{EquationSetDef, EquationTableDef};
pub use monomial::{Monomial, Slot, Variable};
pub use registry::EquationRegistry;
pub use table::{Bindings, EquationTable, Gender, Purpose, TableKey};
