//! Shared fixtures for gateway API tests
#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use gateway_api::AppState;
use gateway_common::ModelDescriptor;
use gateway_network::{
    AgentSummary, ChatMessage, FinishReason, GenerateOptions, GenerateOutput, Network,
    NetworkError, NetworkRegistry, NetworkResult, NetworkStream, StreamChunk, Usage,
};
use std::sync::{Arc, Mutex};

/// Everything a network saw for one call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub options: GenerateOptions,
}

/// Fake network that records its inputs and returns canned results
pub struct RecordingNetwork {
    pub calls: Mutex<Vec<RecordedCall>>,
    pub fail: bool,
}

impl RecordingNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("network was never called")
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, messages: Vec<ChatMessage>, options: GenerateOptions) {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall { messages, options });
    }
}

pub fn canned_output() -> GenerateOutput {
    GenerateOutput {
        network_id: "test-network".to_string(),
        text: "The answer is 42.".to_string(),
        object: None,
        finish_reason: Some(FinishReason::Stop),
        usage: Some(Usage {
            prompt_tokens: 12,
            completion_tokens: 6,
            total_tokens: 18,
        }),
    }
}

pub fn canned_chunks() -> Vec<StreamChunk> {
    vec![
        StreamChunk::text("The answer "),
        StreamChunk::text("is 42."),
        StreamChunk::Finish {
            finish_reason: FinishReason::Stop,
            usage: None,
        },
    ]
}

#[async_trait]
impl Network for RecordingNetwork {
    fn id(&self) -> &str {
        "test-network"
    }

    fn name(&self) -> &str {
        "Test Network"
    }

    fn instructions(&self) -> &str {
        "Route questions to the right specialist."
    }

    fn agents(&self) -> Vec<AgentSummary> {
        vec![
            AgentSummary {
                name: "agent1".to_string(),
                instructions: "Answer math questions.".to_string(),
                provider: "openai".to_string(),
                model_id: "gpt-4o-mini".to_string(),
            },
            AgentSummary {
                name: "agent2".to_string(),
                instructions: "Answer history questions.".to_string(),
                provider: "openai".to_string(),
                model_id: "gpt-4o".to_string(),
            },
        ]
    }

    fn routing_model(&self) -> ModelDescriptor {
        ModelDescriptor::new("openai", "gpt-4o")
    }

    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> NetworkResult<GenerateOutput> {
        self.record(messages, options);
        if self.fail {
            return Err(NetworkError::provider("openai", "upstream unavailable"));
        }
        Ok(canned_output())
    }

    async fn stream(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> NetworkResult<NetworkStream> {
        self.record(messages, options);
        if self.fail {
            return Err(NetworkError::provider("openai", "upstream unavailable"));
        }
        let chunks: Vec<NetworkResult<StreamChunk>> = canned_chunks().into_iter().map(Ok).collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}

pub fn state_with(network: Arc<RecordingNetwork>) -> AppState {
    let mut registry = NetworkRegistry::new();
    registry.register(network).unwrap();
    AppState::new(registry)
}
