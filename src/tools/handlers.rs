//! JSON adapters between the operation registry and [`Engine`].
//!
//! Each operation has a typed argument struct, a JSON schema describing it,
//! and a handler that parses the arguments, calls the engine and encodes the
//! result.

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::compute::DeflectionWeights;
use crate::conversation::ConversationState;
use crate::engine::Engine;
use crate::epa::{Element, Epa, Role};
use crate::equations::Gender;
use crate::error::{ActError, ActResult};
use crate::event::Event;

// ============================================================================
// Argument parsing
// ============================================================================

fn parse<T: DeserializeOwned>(args: Value) -> ActResult<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| ActError::invalid(format!("invalid arguments: {}", e)))
}

fn encode<T: serde::Serialize>(value: &T) -> ActResult<Value> {
    Ok(serde_json::to_value(value)?)
}

fn dictionary<'a>(engine: &'a Engine, requested: &'a Option<String>) -> &'a str {
    requested.as_deref().unwrap_or_else(|| engine.default_dictionary())
}

/// An event whose elements may be absent; the solved element is ignored.
#[derive(Debug, Deserialize)]
struct PartialEvent {
    actor: Option<Epa>,
    behavior: Option<Epa>,
    object: Option<Epa>,
    setting: Option<Epa>,
}

impl PartialEvent {
    fn complete(self, free: Element) -> ActResult<Event> {
        let need = |value: Option<Epa>, element: Element| -> ActResult<Epa> {
            match value {
                Some(v) => Ok(v),
                None if element == free => Ok(Epa::NEUTRAL),
                None => Err(ActError::invalid(format!("event is missing the {}", element))),
            }
        };
        let mut event = Event::new(
            need(self.actor, Element::Actor)?,
            need(self.behavior, Element::Behavior)?,
            self.object.unwrap_or(Epa::NEUTRAL),
        );
        event.setting = match (self.setting, free) {
            (None, Element::Setting) => Some(Epa::NEUTRAL),
            (setting, _) => setting,
        };
        Ok(event)
    }
}

// ============================================================================
// Schemas
// ============================================================================

fn epa_schema() -> Value {
    json!({
        "type": "array",
        "items": {"type": "number"},
        "minItems": 3,
        "maxItems": 3,
        "description": "[evaluation, potency, activity]"
    })
}

fn event_schema(required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": {
            "actor": epa_schema(),
            "behavior": epa_schema(),
            "object": epa_schema(),
            "setting": epa_schema(),
        },
        "required": required,
    })
}

fn string(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

fn enumeration(values: &[&str], description: &str) -> Value {
    json!({"type": "string", "enum": values, "description": description})
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({"type": "object", "properties": properties, "required": required})
}

const ROLES: &[&str] = &["identity", "behavior", "modifier", "setting", "emotion"];
const ELEMENTS: &[&str] = &["actor", "behavior", "object", "setting"];
const GENDERS: &[&str] = &["male", "female"];

fn dictionary_schema() -> Value {
    string("Dictionary key, e.g. us_2015 (defaults to the configured dictionary)")
}

fn gender_schema() -> Value {
    enumeration(GENDERS, "Actor gender; selects a gendered equation table when one exists")
}

// ============================================================================
// lookup / search_labels / closest
// ============================================================================

#[derive(Debug, Deserialize)]
struct LookupArgs {
    label: String,
    #[serde(alias = "type")]
    role: Role,
    dictionary: Option<String>,
}

pub fn lookup_schema() -> Value {
    object(
        json!({
            "label": string("Term to look up, case-insensitive"),
            "role": enumeration(ROLES, "Dictionary partition"),
            "dictionary": dictionary_schema(),
        }),
        &["label", "role"],
    )
}

pub fn lookup(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: LookupArgs = parse(args)?;
        let term = engine
            .lookup(&args.label, args.role, dictionary(engine, &args.dictionary))
            .await?;
        encode(&term)
    })
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    dictionary: Option<String>,
    #[serde(alias = "search_term", alias = "search")]
    query: Option<String>,
}

pub fn search_labels_schema() -> Value {
    object(
        json!({
            "dictionary": dictionary_schema(),
            "query": string("Case-insensitive substring; omit to list every label"),
        }),
        &[],
    )
}

pub fn search_labels(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: SearchArgs = parse(args)?;
        let labels = engine
            .search_labels(dictionary(engine, &args.dictionary), args.query.as_deref())
            .await?;
        encode(&labels)
    })
}

fn default_n() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
struct ClosestArgs {
    epa: Epa,
    #[serde(default = "default_role", alias = "type", alias = "term_type")]
    role: Role,
    dictionary: Option<String>,
    #[serde(default = "default_n")]
    n: i64,
}

fn default_role() -> Role {
    Role::Identity
}

pub fn closest_schema() -> Value {
    object(
        json!({
            "epa": epa_schema(),
            "role": enumeration(ROLES, "Partition to search (default identity)"),
            "dictionary": dictionary_schema(),
            "n": {"type": "integer", "minimum": 1, "default": 5},
        }),
        &["epa"],
    )
}

pub fn closest(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: ClosestArgs = parse(args)?;
        if args.n < 1 {
            return Err(ActError::invalid("n must be at least 1"));
        }
        let n = usize::try_from(args.n).unwrap_or(usize::MAX);
        let hits = engine
            .closest(args.epa, args.role, dictionary(engine, &args.dictionary), n)
            .await?;
        encode(&hits)
    })
}

// ============================================================================
// Impression / deflection / emotion
// ============================================================================

#[derive(Debug, Deserialize)]
struct ImpressionArgs {
    #[serde(alias = "event")]
    fundamental: Event,
    dictionary: Option<String>,
    gender: Option<Gender>,
}

pub fn evaluate_impression_schema() -> Value {
    object(
        json!({
            "fundamental": event_schema(&["actor", "behavior"]),
            "dictionary": dictionary_schema(),
            "gender": gender_schema(),
        }),
        &["fundamental"],
    )
}

pub fn evaluate_impression(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: ImpressionArgs = parse(args)?;
        let transient = engine.evaluate_impression(
            &args.fundamental,
            dictionary(engine, &args.dictionary),
            args.gender,
        )?;
        encode(&transient)
    })
}

#[derive(Debug, Deserialize)]
struct DeflectionArgs {
    fundamental: Event,
    transient: Event,
    weights: Option<DeflectionWeights>,
    dictionary: Option<String>,
}

pub fn deflection_schema() -> Value {
    object(
        json!({
            "fundamental": event_schema(&["actor", "behavior"]),
            "transient": event_schema(&["actor", "behavior"]),
            "weights": {
                "type": "object",
                "description": "Per-element inverse-variance weights, each [e, p, a] (default 1.0)",
            },
            "dictionary": string("Use this dictionary's weights when none are given"),
        }),
        &["fundamental", "transient"],
    )
}

pub fn deflection(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: DeflectionArgs = parse(args)?;
        let result = engine.deflection(
            &args.fundamental,
            &args.transient,
            args.weights.as_ref(),
            args.dictionary.as_deref(),
        )?;
        encode(&result)
    })
}

fn default_element() -> Element {
    Element::Actor
}

#[derive(Debug, Deserialize)]
struct EmotionArgs {
    fundamental: Event,
    transient: Option<Event>,
    #[serde(default = "default_element")]
    element: Element,
    dictionary: Option<String>,
    gender: Option<Gender>,
}

pub fn predict_emotion_schema() -> Value {
    object(
        json!({
            "fundamental": event_schema(&["actor", "behavior"]),
            "transient": event_schema(&["actor", "behavior"]),
            "element": enumeration(&["actor", "object"], "Whose emotion (default actor)"),
            "dictionary": dictionary_schema(),
            "gender": gender_schema(),
        }),
        &["fundamental"],
    )
}

pub fn predict_emotion(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: EmotionArgs = parse(args)?;
        let emotion = engine.predict_emotion(
            &args.fundamental,
            args.transient.as_ref(),
            args.element,
            dictionary(engine, &args.dictionary),
            args.gender,
        )?;
        encode(&emotion)
    })
}

// ============================================================================
// Solvers
// ============================================================================

#[derive(Debug, Deserialize)]
struct SolveArgs {
    event: PartialEvent,
    #[serde(default = "default_element", alias = "role")]
    element: Element,
    dictionary: Option<String>,
    gender: Option<Gender>,
}

pub fn solve_for_role_schema() -> Value {
    object(
        json!({
            "event": event_schema(&[]),
            "element": enumeration(
                ELEMENTS,
                "Element to solve for; its value in the event is ignored"
            ),
            "dictionary": dictionary_schema(),
            "gender": gender_schema(),
        }),
        &["event", "element"],
    )
}

pub fn solve_for_role(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: SolveArgs = parse(args)?;
        let event = args.event.complete(args.element)?;
        let epa = engine.solve_for_role(
            &event,
            args.element,
            dictionary(engine, &args.dictionary),
            args.gender,
        )?;
        encode(&epa)
    })
}

pub fn reidentify_schema() -> Value {
    object(
        json!({
            "event": event_schema(&["actor", "behavior"]),
            "element": enumeration(ELEMENTS, "Element to re-identify (default actor)"),
            "dictionary": dictionary_schema(),
            "gender": gender_schema(),
        }),
        &["event"],
    )
}

pub fn reidentify(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: SolveArgs = parse(args)?;
        let event = args.event.complete(args.element)?;
        let epa = engine.reidentify(
            &event,
            args.element,
            dictionary(engine, &args.dictionary),
            args.gender,
        )?;
        encode(&epa)
    })
}

#[derive(Debug, Deserialize)]
struct OptimalBehaviorArgs {
    actor: Epa,
    #[serde(default)]
    object: Epa,
    setting: Option<Epa>,
    dictionary: Option<String>,
    gender: Option<Gender>,
}

pub fn optimal_behavior_schema() -> Value {
    object(
        json!({
            "actor": epa_schema(),
            "object": epa_schema(),
            "setting": epa_schema(),
            "dictionary": dictionary_schema(),
            "gender": gender_schema(),
        }),
        &["actor"],
    )
}

pub fn optimal_behavior(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: OptimalBehaviorArgs = parse(args)?;
        let epa = engine.optimal_behavior(
            args.actor,
            args.object,
            args.setting,
            dictionary(engine, &args.dictionary),
            args.gender,
        )?;
        encode(&epa)
    })
}

#[derive(Debug, Deserialize)]
struct AmalgamateArgs {
    modifier: Epa,
    identity: Epa,
    dictionary: Option<String>,
}

pub fn amalgamate_schema() -> Value {
    object(
        json!({
            "modifier": epa_schema(),
            "identity": epa_schema(),
            "dictionary": dictionary_schema(),
        }),
        &["modifier", "identity"],
    )
}

pub fn amalgamate(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: AmalgamateArgs = parse(args)?;
        let epa = engine.amalgamate(
            args.modifier,
            args.identity,
            dictionary(engine, &args.dictionary),
        )?;
        encode(&epa)
    })
}

// ============================================================================
// Conversations
// ============================================================================

#[derive(Debug, Deserialize)]
struct InitArgs {
    #[serde(alias = "actor_label")]
    actor: String,
    #[serde(alias = "object_label")]
    object: String,
    dictionary: Option<String>,
    gender: Option<Gender>,
}

pub fn init_conversation_schema() -> Value {
    object(
        json!({
            "actor": string("Actor identity label"),
            "object": string("Object identity label"),
            "dictionary": dictionary_schema(),
            "gender": gender_schema(),
        }),
        &["actor", "object"],
    )
}

pub fn init_conversation(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let args: InitArgs = parse(args)?;
        let state = engine
            .init_conversation(
                &args.actor,
                &args.object,
                dictionary(engine, &args.dictionary),
                args.gender,
            )
            .await?;
        encode(&state)
    })
}

#[derive(Debug, Deserialize)]
struct StepArgs {
    state: ConversationState,
    #[serde(alias = "behavior_label")]
    behavior: String,
}

pub fn step_conversation_schema() -> Value {
    object(
        json!({
            "state": {
                "type": "object",
                "description": "Conversation state returned by init_conversation or a previous step",
            },
            "behavior": string("Behavior label enacted by the actor toward the object"),
        }),
        &["state", "behavior"],
    )
}

pub fn step_conversation(engine: &Engine, args: Value) -> BoxFuture<'_, ActResult<Value>> {
    Box::pin(async move {
        let StepArgs { mut state, behavior } = parse(args)?;
        engine.step_conversation(&mut state, &behavior).await?;
        encode(&state)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_event_fills_only_the_free_element() {
        let partial: PartialEvent =
            serde_json::from_value(json!({"actor": [1.0, 1.0, 1.0], "object": [0.5, 0.5, 0.5]}))
                .unwrap();
        let ev = partial.complete(Element::Behavior).unwrap();
        assert_eq!(ev.behavior, Epa::NEUTRAL);
        assert!(ev.setting.is_none());

        let partial: PartialEvent =
            serde_json::from_value(json!({"behavior": [1.0, 1.0, 1.0]})).unwrap();
        assert!(matches!(
            partial.complete(Element::Behavior),
            Err(ActError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_wrong_arity_is_invalid_input() {
        let args = json!({"modifier": [1.0, 2.0], "identity": [0.0, 0.0, 0.0]});
        let err = parse::<AmalgamateArgs>(args).unwrap_err();
        assert!(matches!(err, ActError::InvalidInput(_)));
    }

    #[test]
    fn test_aliases_from_the_tool_vocabulary() {
        let args: LookupArgs = parse(json!({"label": "doctor", "type": "identity"})).unwrap();
        assert_eq!(args.role, Role::Identity);
        let args: ClosestArgs = parse(json!({"epa": [0, 0, 0], "term_type": "behavior"})).unwrap();
        assert_eq!(args.role, Role::Behavior);
        assert_eq!(args.n, 5);
    }
}
