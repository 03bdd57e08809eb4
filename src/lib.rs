//! # act-engine
//!
//! Affect Control Theory computation engine. Every identity, behavior,
//! modifier, setting and emotion is a point in Evaluation-Potency-Activity
//! space; the engine computes the transient impressions an event produces,
//! the deflection between fundamentals and transients, and solves for the
//! behaviors, re-identifications and modified identities that minimise it.
//!
//! The pure computations live in [`compute`]; [`Engine`] binds them to the
//! loaded equation tables and a [`dictionary::DictionaryService`], and
//! [`tools::OPERATIONS`] exposes them to the HTTP ([`server`]) and MCP
//! ([`mcp`]) surfaces.

pub mod compute;
pub mod config;
pub mod conversation;
pub mod dictionary;
pub mod engine;
pub mod epa;
pub mod equations;
pub mod error;
pub mod event;
pub mod mcp;
pub mod server;
pub mod tools;

pub use compute::{ClosestMatch, DeflectionResult, DeflectionWeights};
pub use config::EngineConfig;
pub use conversation::{ConversationState, StepResult, CONVERSATION_SCHEMA_VERSION};
pub use dictionary::{DictionaryService, Term};
pub use engine::Engine;
pub use epa::{Dimension, Element, Epa, Role};
pub use equations::{EquationRegistry, EquationTable, Gender, Purpose};
pub use error::{ActError, ActResult};
pub use event::Event;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
