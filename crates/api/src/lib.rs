//! # Agent Network Gateway API
//!
//! HTTP surface over a registry of multi-agent networks.
//!
//! ## Endpoints
//!
//! - **GET** `/api/networks` - List every registered network
//! - **GET** `/api/networks/{network_id}` - Fetch one network
//! - **POST** `/api/networks/{network_id}/generate` - Synchronous generation
//! - **POST** `/api/networks/{network_id}/stream` - Streaming generation (SSE)
//! - **GET** `/health` - Liveness
//! - **GET** `/api-doc/openapi.json` - OpenAPI document
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │      Routes         │ <- axum extractors, SSE framing
//! ├─────────────────────┤
//! │     Handlers        │ <- lookup, validation, context merge
//! ├─────────────────────┤
//! │  Network Registry   │ <- id -> Arc<dyn Network>
//! ├─────────────────────┤
//! │      Network        │ <- routing model + agents
//! └─────────────────────┘
//! ```
//!
//! Handlers hold no state of their own; everything they need arrives in
//! [`AppState`] and the per-request [`gateway_network::RuntimeContext`].

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use server::{build_router, AppState, GatewayServer};
pub use types::*;
