//! Axum route handlers for the ACT HTTP server.
//!
//! Operation calls answer with the `{ok, data, meta}` envelope. Failures use
//! the same envelope with `ok: false` and an HTTP status derived from the
//! error code.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::conversation::ConversationState;
use crate::engine::Engine;
use crate::equations::Gender;
use crate::error::ActError;
use crate::tools::{self, ToolResponse, OPERATIONS};

type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    /// Server-held conversations; one lock each so steps on the same
    /// conversation run one at a time.
    pub conversations: Arc<DashMap<Uuid, Arc<Mutex<ConversationState>>>>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
            conversations: Arc::new(DashMap::new()),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/tools", get(list_tools_handler))
        .route("/tools/:name", post(call_tool_handler))
        .route("/conversations", post(create_conversation_handler))
        .route(
            "/conversations/:id",
            get(get_conversation_handler).delete(delete_conversation_handler),
        )
        .route("/conversations/:id/steps", post(step_conversation_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP status for an envelope error code.
fn status_for(code: &str) -> StatusCode {
    match code {
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "INVALID_INPUT" => StatusCode::BAD_REQUEST,
        "SINGULAR_SYSTEM" => StatusCode::UNPROCESSABLE_ENTITY,
        "SERVICE_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reply(response: ToolResponse) -> ApiResult {
    match response.error_code() {
        None => Ok((StatusCode::OK, Json(response.to_value()))),
        Some(code) => Err((status_for(code), Json(response.to_value()))),
    }
}

fn error_reply(operation: &str, err: &ActError) -> (StatusCode, Json<Value>) {
    (
        status_for(err.error_code()),
        Json(ToolResponse::from_error(operation, err).to_value()),
    )
}

fn unknown_conversation(id: Uuid) -> (StatusCode, Json<Value>) {
    error_reply(
        "conversation",
        &ActError::NotFound(format!("conversation {}", id)),
    )
}

/// GET /health — liveness probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "act-engine",
        "dictionaries": state.engine.equations().dictionaries(),
        "conversations": state.conversations.len(),
    }))
}

/// GET /tools — every registered operation with its input schema.
async fn list_tools_handler() -> impl IntoResponse {
    let tools: Vec<Value> = OPERATIONS.iter().map(|op| op.describe()).collect();
    Json(serde_json::json!({ "tools": tools }))
}

/// POST /tools/:name — call one operation.
async fn call_tool_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult {
    let args = body.map(|Json(v)| v).unwrap_or(Value::Null);
    reply(tools::dispatch(&state.engine, &name, args).await)
}

#[derive(Debug, Deserialize)]
struct CreateConversation {
    actor: String,
    object: String,
    dictionary: Option<String>,
    gender: Option<Gender>,
}

/// POST /conversations — look up both identities and hold the new state.
async fn create_conversation_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateConversation>,
) -> ApiResult {
    let dictionary = request
        .dictionary
        .as_deref()
        .unwrap_or_else(|| state.engine.default_dictionary());
    let conversation = state
        .engine
        .init_conversation(&request.actor, &request.object, dictionary, request.gender)
        .await
        .map_err(|e| error_reply("init_conversation", &e))?;
    let id = Uuid::new_v4();
    let body = serde_json::json!({ "id": id, "state": conversation });
    state
        .conversations
        .insert(id, Arc::new(Mutex::new(conversation)));
    tracing::info!(%id, "conversation created");
    Ok((StatusCode::CREATED, Json(body)))
}

fn conversation(
    state: &AppState,
    id: Uuid,
) -> Result<Arc<Mutex<ConversationState>>, (StatusCode, Json<Value>)> {
    state
        .conversations
        .get(&id)
        .map(|entry| Arc::clone(entry.value()))
        .ok_or_else(|| unknown_conversation(id))
}

/// GET /conversations/:id — the current state.
async fn get_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult {
    let held = conversation(&state, id)?;
    let guard = held.lock().await;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "id": id, "state": *guard })),
    ))
}

#[derive(Debug, Deserialize)]
struct StepRequest {
    #[serde(alias = "behavior_label")]
    behavior: String,
}

/// POST /conversations/:id/steps — enact a behavior.
///
/// A failed step leaves the held state unchanged.
async fn step_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StepRequest>,
) -> ApiResult {
    let held = conversation(&state, id)?;
    let mut guard = held.lock().await;
    let step = state
        .engine
        .step_conversation(&mut guard, &request.behavior)
        .await
        .map_err(|e| error_reply("step_conversation", &e))?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "id": id,
            "step": step,
            "history_len": guard.len(),
        })),
    ))
}

/// DELETE /conversations/:id
async fn delete_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult {
    match state.conversations.remove(&id) {
        Some(_) => Ok((StatusCode::OK, Json(serde_json::json!({ "deleted": id })))),
        None => Err(unknown_conversation(id)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
