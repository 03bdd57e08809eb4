//! HTTP server over the operation registry.
//!
//! # Endpoints
//!
//! - `GET    /health`                   — Liveness probe
//! - `GET    /tools`                    — List operations and their schemas
//! - `POST   /tools/:name`              — Call an operation with JSON arguments
//! - `POST   /conversations`            — Start a server-held conversation
//! - `GET    /conversations/:id`        — Current conversation state
//! - `POST   /conversations/:id/steps`  — Enact a behavior
//! - `DELETE /conversations/:id`        — Drop a conversation

pub mod routes;

pub use routes::{app_router, AppState};
