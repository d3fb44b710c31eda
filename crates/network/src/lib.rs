//! Network abstraction for the gateway
//!
//! A network is a named group of agents behind a routing model. This crate
//! provides:
//! - the [`Network`] trait the HTTP layer delegates to
//! - [`RuntimeContext`], the key/value bag merged per request
//! - message normalization for the flexible `messages` request field
//! - [`NetworkRegistry`], the id-keyed set of served networks
//! - [`LlmNetwork`], an OpenAI-compatible implementation built from config

pub mod agent;
pub mod context;
pub mod error;
pub mod llm;
pub mod message;
pub mod network;
pub mod registry;

pub use agent::{Agent, AgentSummary};
pub use context::RuntimeContext;
pub use error::{NetworkError, NetworkResult};
pub use llm::{LlmNetwork, ProviderClients};
pub use message::{ChatMessage, MessageInput, MessageItem, Role};
pub use network::{
    FinishReason, GenerateOptions, GenerateOutput, Network, NetworkStream, NetworkSummary,
    StreamChunk, Usage,
};
pub use registry::NetworkRegistry;
