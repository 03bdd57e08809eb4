//! The engine: one object built at startup that owns the equation tables,
//! the dictionary capability and the configuration, and exposes every
//! operation to the serving layers.
//!
//! # Architecture
//!
//! ```text
//! EngineConfig::from_env()
//!   ↓
//! Engine::from_config()
//!   ├─ EquationRegistry   built-in sets + ACT_DATA_DIR/equations
//!   └─ ResilientDictionary(InMemoryDictionary)
//!                          built-in lexicons + ACT_DATA_DIR/dictionaries
//!   ↓
//! tools::OPERATIONS  →  HTTP server / MCP stdio server
//! ```
//!
//! Pure computations are synchronous; anything touching the dictionary is
//! `async`.

use std::sync::Arc;

use crate::compute::{self, ClosestMatch, DeflectionResult, DeflectionWeights};
use crate::config::EngineConfig;
use crate::conversation::{ConversationState, StepInputs, StepResult};
use crate::dictionary::{DictionaryService, InMemoryDictionary, ResilientDictionary, Term};
use crate::epa::{Element, Epa, Role};
use crate::equations::{EquationRegistry, EquationTable, Gender, Purpose};
use crate::error::ActResult;
use crate::event::Event;

/// Shared, immutable ACT engine.
#[derive(Debug, Clone)]
pub struct Engine {
    equations: Arc<EquationRegistry>,
    dictionary: Arc<dyn DictionaryService>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        equations: EquationRegistry,
        dictionary: Arc<dyn DictionaryService>,
        config: EngineConfig,
    ) -> Self {
        Self {
            equations: Arc::new(equations),
            dictionary,
            config,
        }
    }

    /// Build the engine from bundled data plus the configured data directory.
    pub fn from_config(config: EngineConfig) -> ActResult<Self> {
        let mut equations = EquationRegistry::builtin()?;
        let mut lexicons = InMemoryDictionary::builtin()?;
        if let Some(dir) = &config.data_dir {
            let tables = equations.load_directory(&dir.join("equations"))?;
            let terms = lexicons.load_directory(&dir.join("dictionaries"))?;
            log::info!(
                "Loaded {} equation tables and {} terms from {}",
                tables,
                terms,
                dir.display()
            );
        }
        let dictionary = ResilientDictionary::new(Arc::new(lexicons))
            .with_timeout(config.lookup_timeout)
            .with_retries(config.lookup_retries);
        Ok(Self::new(equations, Arc::new(dictionary), config))
    }

    /// Engine over the bundled data with default settings.
    pub fn builtin() -> ActResult<Self> {
        Self::from_config(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn equations(&self) -> &EquationRegistry {
        &self.equations
    }

    pub fn dictionary(&self) -> &Arc<dyn DictionaryService> {
        &self.dictionary
    }

    /// The configured default dictionary.
    pub fn default_dictionary(&self) -> &str {
        &self.config.default_dictionary
    }

    pub fn table(
        &self,
        dictionary: &str,
        purpose: Purpose,
        gender: Option<Gender>,
    ) -> ActResult<Arc<EquationTable>> {
        self.equations.resolve(dictionary, purpose, gender)
    }

    fn weights(&self, dictionary: &str) -> Option<&DeflectionWeights> {
        self.equations.weights(dictionary)
    }

    // -----------------------------------------------------------------------
    // Dictionary operations
    // -----------------------------------------------------------------------

    pub async fn lookup(&self, label: &str, role: Role, dictionary: &str) -> ActResult<Term> {
        self.dictionary.lookup(label, role, dictionary).await
    }

    pub async fn search_labels(
        &self,
        dictionary: &str,
        query: Option<&str>,
    ) -> ActResult<Vec<String>> {
        self.dictionary.search(dictionary, query).await
    }

    /// The `n` terms of a partition nearest to `epa`.
    pub async fn closest(
        &self,
        epa: Epa,
        role: Role,
        dictionary: &str,
        n: usize,
    ) -> ActResult<Vec<ClosestMatch>> {
        let entries = self.dictionary.entries(role, dictionary).await?;
        compute::closest_terms(&entries, epa, n)
    }

    // -----------------------------------------------------------------------
    // Pure computations
    // -----------------------------------------------------------------------

    pub fn evaluate_impression(
        &self,
        event: &Event,
        dictionary: &str,
        gender: Option<Gender>,
    ) -> ActResult<Event> {
        let table = self.table(dictionary, Purpose::Impression, gender)?;
        compute::evaluate_impression(event, &table)
    }

    /// Deflection under explicit weights, else the dictionary's weights
    /// when one is named, else unweighted.
    pub fn deflection(
        &self,
        fundamental: &Event,
        transient: &Event,
        weights: Option<&DeflectionWeights>,
        dictionary: Option<&str>,
    ) -> ActResult<DeflectionResult> {
        let weights = weights.or_else(|| dictionary.and_then(|d| self.weights(d)));
        compute::deflection(fundamental, transient, weights)
    }

    pub fn solve_for_role(
        &self,
        event: &Event,
        element: Element,
        dictionary: &str,
        gender: Option<Gender>,
    ) -> ActResult<Epa> {
        let table = self.table(dictionary, Purpose::Impression, gender)?;
        compute::solve_for_role(event, element, &table, self.weights(dictionary))
    }

    pub fn optimal_behavior(
        &self,
        actor: Epa,
        object: Epa,
        setting: Option<Epa>,
        dictionary: &str,
        gender: Option<Gender>,
    ) -> ActResult<Epa> {
        let table = self.table(dictionary, Purpose::Impression, gender)?;
        compute::optimal_behavior(actor, object, setting, &table, self.weights(dictionary))
    }

    /// New EPA for `element` that best accounts for the observed event.
    pub fn reidentify(
        &self,
        event: &Event,
        element: Element,
        dictionary: &str,
        gender: Option<Gender>,
    ) -> ActResult<Epa> {
        let solved = self.solve_for_role(event, element, dictionary, gender)?;
        log::debug!("reidentified {} as {}", element, solved);
        Ok(solved)
    }

    pub fn amalgamate(&self, modifier: Epa, identity: Epa, dictionary: &str) -> ActResult<Epa> {
        let table = self.table(dictionary, Purpose::Amalgamation, None)?;
        compute::amalgamate(modifier, identity, &table)
    }

    /// Emotion of `element` (actor by default). A missing transient is
    /// computed from the fundamental first.
    pub fn predict_emotion(
        &self,
        fundamental: &Event,
        transient: Option<&Event>,
        element: Element,
        dictionary: &str,
        gender: Option<Gender>,
    ) -> ActResult<Epa> {
        let computed;
        let transient = match transient {
            Some(t) => t,
            None => {
                computed = self.evaluate_impression(fundamental, dictionary, gender)?;
                &computed
            }
        };
        let table = self.table(dictionary, Purpose::Emotion, gender)?;
        compute::predict_emotion_for(element, fundamental, transient, &table)
    }

    // -----------------------------------------------------------------------
    // Conversations
    // -----------------------------------------------------------------------

    /// Look up both identities and start an empty conversation.
    pub async fn init_conversation(
        &self,
        actor_label: &str,
        object_label: &str,
        dictionary: &str,
        gender: Option<Gender>,
    ) -> ActResult<ConversationState> {
        let actor = self.lookup(actor_label, Role::Identity, dictionary).await?;
        let object = self.lookup(object_label, Role::Identity, dictionary).await?;
        // Fail at init rather than on the first step.
        self.table(dictionary, Purpose::Impression, gender)?;
        log::info!(
            "conversation started: {} -> {} ({})",
            actor.term,
            object.term,
            dictionary
        );
        Ok(ConversationState::new(actor, object, dictionary).with_gender(gender))
    }

    /// Enact `behavior_label` from the state's actor toward its object.
    ///
    /// On success exactly one step is appended and returned. On failure the
    /// state is untouched.
    pub async fn step_conversation(
        &self,
        state: &mut ConversationState,
        behavior_label: &str,
    ) -> ActResult<StepResult> {
        state.check_schema()?;
        let behavior = self
            .lookup(behavior_label, Role::Behavior, &state.dictionary)
            .await?;
        let fundamentals = Event::new(state.actor.epa, behavior.epa, state.object.epa);
        let transients = self.evaluate_impression(&fundamentals, &state.dictionary, state.gender)?;
        let deflection = compute::deflection(
            &fundamentals,
            &transients,
            self.weights(&state.dictionary),
        )?;
        let step = StepResult {
            inputs: StepInputs {
                actor: state.actor.clone(),
                behavior,
                object: state.object.clone(),
            },
            fundamentals,
            transients,
            deflection,
        };
        log::debug!(
            "step {}: {} {} {} deflection {:.3}",
            state.len() + 1,
            state.actor.term,
            step.inputs.behavior.term,
            state.object.term,
            step.deflection.total
        );
        state.record(step.clone());
        Ok(step)
    }
}
