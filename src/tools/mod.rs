//! Operation registry: a compile-time table mapping operation names to
//! handlers and JSON input schemas.
//!
//! Both serving layers (HTTP and MCP stdio) list and call operations through
//! [`OPERATIONS`] and [`dispatch`]; neither knows the engine's Rust API.

pub mod envelope;
pub mod handlers;

use std::time::Instant;

use futures::future::BoxFuture;
use serde_json::{json, Value};

use crate::engine::Engine;
use crate::error::ActResult;

pub use envelope::{ToolError, ToolResponse};

/// Async JSON handler for one operation.
pub type Handler = fn(&Engine, Value) -> BoxFuture<'_, ActResult<Value>>;

/// One registered operation.
#[derive(Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: fn() -> Value,
    pub handler: Handler,
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation").field("name", &self.name).finish()
    }
}

impl Operation {
    /// Name, description and schema as JSON (MCP `tools/list` shape).
    pub fn describe(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": (self.input_schema)(),
        })
    }
}

/// Every operation the engine exposes.
pub static OPERATIONS: &[Operation] = &[
    Operation {
        name: "lookup",
        description: "Look up the EPA fundamentals of a label in a dictionary partition.",
        input_schema: handlers::lookup_schema,
        handler: handlers::lookup,
    },
    Operation {
        name: "search_labels",
        description: "List dictionary labels containing a substring, across all partitions.",
        input_schema: handlers::search_labels_schema,
        handler: handlers::search_labels,
    },
    Operation {
        name: "evaluate_impression",
        description: "Compute the transient impressions produced by a fundamental event.",
        input_schema: handlers::evaluate_impression_schema,
        handler: handlers::evaluate_impression,
    },
    Operation {
        name: "deflection",
        description: "Weighted squared distance between fundamental and transient events.",
        input_schema: handlers::deflection_schema,
        handler: handlers::deflection,
    },
    Operation {
        name: "solve_for_role",
        description: "EPA for one event element that minimises deflection, others fixed.",
        input_schema: handlers::solve_for_role_schema,
        handler: handlers::solve_for_role,
    },
    Operation {
        name: "optimal_behavior",
        description: "Behavior EPA that best confirms an actor acting on an object.",
        input_schema: handlers::optimal_behavior_schema,
        handler: handlers::optimal_behavior,
    },
    Operation {
        name: "reidentify",
        description: "New EPA for the actor (or object) that best accounts for an event.",
        input_schema: handlers::reidentify_schema,
        handler: handlers::reidentify,
    },
    Operation {
        name: "amalgamate",
        description: "Combine a modifier and an identity into a modified identity.",
        input_schema: handlers::amalgamate_schema,
        handler: handlers::amalgamate,
    },
    Operation {
        name: "closest",
        description: "Dictionary terms nearest to an EPA vector, nearest first.",
        input_schema: handlers::closest_schema,
        handler: handlers::closest,
    },
    Operation {
        name: "predict_emotion",
        description: "Predict the emotion felt by the actor (or object) of an event.",
        input_schema: handlers::predict_emotion_schema,
        handler: handlers::predict_emotion,
    },
    Operation {
        name: "init_conversation",
        description: "Start a conversation between an actor and an object identity.",
        input_schema: handlers::init_conversation_schema,
        handler: handlers::init_conversation,
    },
    Operation {
        name: "step_conversation",
        description: "Enact a behavior in a conversation and append the resulting step.",
        input_schema: handlers::step_conversation_schema,
        handler: handlers::step_conversation,
    },
];

/// Find an operation by name.
pub fn find(name: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// Run an operation and wrap the outcome in the response envelope.
pub async fn dispatch(engine: &Engine, name: &str, args: Value) -> ToolResponse {
    let Some(op) = find(name) else {
        return ToolResponse::failure(
            "NOT_FOUND",
            format!("Unknown operation '{}'", name),
            json!({ "available": OPERATIONS.iter().map(|op| op.name).collect::<Vec<_>>() }),
        );
    };
    let started = Instant::now();
    match (op.handler)(engine, args).await {
        Ok(data) => {
            let elapsed = started.elapsed();
            log::debug!("{} succeeded in {:?}", name, elapsed);
            ToolResponse::success(
                data,
                json!({
                    "operation": name,
                    "version": crate::VERSION,
                    "duration_ms": elapsed.as_secs_f64() * 1000.0,
                }),
            )
        }
        Err(e) => {
            log::warn!("{} failed: {}", name, e);
            ToolResponse::from_error(name, &e)
        }
    }
}
