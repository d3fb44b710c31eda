//! Type definitions for the gateway HTTP API

use chrono::{DateTime, Utc};
use gateway_network::MessageInput;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Body of a generate or stream request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// A string, a list of strings, or a list of `{ role, content }` objects
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub messages: Option<MessageInput>,

    #[serde(default, rename = "resourceId")]
    pub resource_id: Option<String>,

    #[serde(default, rename = "threadId")]
    pub thread_id: Option<String>,

    /// JSON schema for structured output
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub experimental_output: Option<Value>,

    /// Per-request runtime context, merged over the ambient context
    #[serde(default, rename = "runtimeContext")]
    #[schema(value_type = Option<Object>)]
    pub runtime_context: Option<Map<String, Value>>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Health status
    pub status: String,

    /// Optional additional information
    pub message: Option<String>,

    /// Timestamp of health check
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    pub code: Option<String>,

    /// Timestamp of error
    pub timestamp: DateTime<Utc>,
}
