//! Conversation state: a typed, versioned trace of ACT steps.
//!
//! ```text
//! Uninitialized --init--> Ready --step ok--> Ready (history + 1)
//!                           └----step err--> Ready (unchanged)
//! ```
//!
//! The state is plain data. [`crate::engine::Engine`] drives the
//! transitions; a step only touches the state after every stage succeeded.

use serde::{Deserialize, Serialize};

use crate::compute::DeflectionResult;
use crate::dictionary::Term;
use crate::equations::Gender;
use crate::error::{ActError, ActResult};
use crate::event::Event;

/// Version tag carried by every serialized [`ConversationState`].
pub const CONVERSATION_SCHEMA_VERSION: u32 = 1;

/// The looked-up terms that formed a step's fundamental event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInputs {
    pub actor: Term,
    pub behavior: Term,
    pub object: Term,
}

/// One successful step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub inputs: StepInputs,
    pub fundamentals: Event,
    pub transients: Event,
    pub deflection: DeflectionResult,
}

/// An actor/object pair and the steps enacted between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub schema_version: u32,
    pub actor: Term,
    pub object: Term,
    pub dictionary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub history: Vec<StepResult>,
    #[serde(default)]
    pub last_result: Option<StepResult>,
}

impl ConversationState {
    pub fn new(actor: Term, object: Term, dictionary: impl Into<String>) -> Self {
        Self {
            schema_version: CONVERSATION_SCHEMA_VERSION,
            actor,
            object,
            dictionary: dictionary.into(),
            gender: None,
            history: Vec::new(),
            last_result: None,
        }
    }

    pub fn with_gender(mut self, gender: Option<Gender>) -> Self {
        self.gender = gender;
        self
    }

    /// Number of successful steps.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Reject states written under another schema version.
    pub fn check_schema(&self) -> ActResult<()> {
        if self.schema_version != CONVERSATION_SCHEMA_VERSION {
            return Err(ActError::invalid(format!(
                "conversation schema version {} is not supported (expected {})",
                self.schema_version, CONVERSATION_SCHEMA_VERSION
            )));
        }
        Ok(())
    }

    /// Append a completed step and make it the last result.
    pub(crate) fn record(&mut self, step: StepResult) {
        self.last_result = Some(step.clone());
        self.history.push(step);
    }
}
