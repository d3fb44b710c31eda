//! The `Network` abstraction served by the gateway

use async_trait::async_trait;
use futures::stream::BoxStream;
use gateway_common::ModelDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentSummary;
use crate::context::RuntimeContext;
use crate::error::NetworkResult;
use crate::message::ChatMessage;

/// Listing representation of a network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub id: String,
    pub name: String,
    pub instructions: String,
    pub agents: Vec<AgentSummary>,
    pub routing_model: ModelDescriptor,
}

/// Per-call options forwarded to the network
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub runtime_context: RuntimeContext,
    /// Owner of the conversation memory, if any
    pub resource_id: Option<String>,
    pub thread_id: Option<String>,
    /// JSON schema the final answer must conform to
    pub output: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    Error,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Result of a synchronous generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutput {
    pub network_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One event of a streaming generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamChunk {
    #[serde(rename_all = "camelCase")]
    TextDelta { text_delta: String },
    #[serde(rename_all = "camelCase")]
    Finish {
        finish_reason: FinishReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },
    Error { message: String },
}

impl StreamChunk {
    pub fn text(delta: impl Into<String>) -> Self {
        Self::TextDelta {
            text_delta: delta.into(),
        }
    }

    /// Name used for the SSE `event:` field
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamChunk::TextDelta { .. } => "text-delta",
            StreamChunk::Finish { .. } => "finish",
            StreamChunk::Error { .. } => "error",
        }
    }
}

pub type NetworkStream = BoxStream<'static, NetworkResult<StreamChunk>>;

/// A named group of agents behind a routing model
#[async_trait]
pub trait Network: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn instructions(&self) -> &str;

    fn agents(&self) -> Vec<AgentSummary>;

    fn routing_model(&self) -> ModelDescriptor;

    fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            id: self.id().to_string(),
            name: self.name().to_string(),
            instructions: self.instructions().to_string(),
            agents: self.agents(),
            routing_model: self.routing_model(),
        }
    }

    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> NetworkResult<GenerateOutput>;

    async fn stream(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> NetworkResult<NetworkStream>;
}
