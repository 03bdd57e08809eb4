//! Model Context Protocol (MCP) server.
//!
//! Exposes every operation in [`crate::tools::OPERATIONS`] as an MCP tool
//! over line-delimited JSON-RPC 2.0 on stdin/stdout. Tool results carry the
//! same `{ok, data, meta}` envelope as the HTTP server, as text content.

pub mod protocol;
pub mod server;

pub use protocol::{JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse};
pub use server::McpServer;
