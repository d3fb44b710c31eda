//! OpenAI-compatible network implementation
//!
//! `LlmNetwork` hands the whole conversation to its routing model together
//! with the network instructions and the roster of participating agents.
//! The routing model decides which agent persona answers; the gateway only
//! shapes the prompt and relays the result.

mod prompt;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionStreamOptions, CompletionUsage,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
        CreateChatCompletionStreamResponse, FinishReason as OpenAiFinishReason, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use gateway_common::{ModelDescriptor, NetworkConfig, ProviderConfig};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use crate::agent::{Agent, AgentSummary};
use crate::error::{NetworkError, NetworkResult};
use crate::message::ChatMessage;
use crate::network::{
    FinishReason, GenerateOptions, GenerateOutput, Network, NetworkStream, StreamChunk, Usage,
};

pub use prompt::{build_messages, system_prompt};

/// One completion client per configured provider
#[derive(Clone, Default)]
pub struct ProviderClients {
    clients: BTreeMap<String, Client<OpenAIConfig>>,
}

impl ProviderClients {
    pub fn from_config(providers: &BTreeMap<String, ProviderConfig>) -> Self {
        let clients = providers
            .iter()
            .map(|(name, provider)| {
                let mut config = OpenAIConfig::new().with_api_base(&provider.api_base);
                match provider.api_key() {
                    Some(key) => config = config.with_api_key(key),
                    None => debug!(provider = %name, "No API key configured for provider"),
                }
                (name.clone(), Client::with_config(config))
            })
            .collect();
        Self { clients }
    }

    pub fn get(&self, provider: &str) -> Option<&Client<OpenAIConfig>> {
        self.clients.get(provider)
    }
}

pub struct LlmNetwork {
    id: String,
    name: String,
    instructions: String,
    agents: Vec<Agent>,
    routing_model: ModelDescriptor,
    temperature: Option<f32>,
    client: Client<OpenAIConfig>,
}

impl LlmNetwork {
    pub fn from_config(config: &NetworkConfig, clients: &ProviderClients) -> NetworkResult<Self> {
        let client = clients
            .get(&config.routing_model.provider)
            .cloned()
            .ok_or_else(|| {
                NetworkError::config(format!(
                    "network '{}' routes through unknown provider '{}'",
                    config.name, config.routing_model.provider
                ))
            })?;

        Ok(Self {
            id: config.resolved_id(),
            name: config.name.clone(),
            instructions: config.instructions.clone(),
            agents: config.agents.iter().map(Agent::from).collect(),
            routing_model: config.routing_model.clone(),
            temperature: config.temperature,
            client,
        })
    }

    fn provider_error(&self, err: impl ToString) -> NetworkError {
        NetworkError::provider(&self.routing_model.provider, err)
    }

    fn build_request(
        &self,
        messages: &[ChatMessage],
        options: &GenerateOptions,
    ) -> NetworkResult<CreateChatCompletionRequest> {
        let system = system_prompt(&self.instructions, &self.agents, &options.runtime_context);
        let request_messages: Vec<ChatCompletionRequestMessage> =
            build_messages(&system, messages).map_err(|e| self.provider_error(e))?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.routing_model.model_id).messages(request_messages);

        if let Some(temperature) = self.temperature {
            args.temperature(temperature);
        }
        if let Some(resource_id) = &options.resource_id {
            args.user(resource_id);
        }
        if let Some(schema) = &options.output {
            args.response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name: "output".to_string(),
                    schema: Some(schema.clone()),
                    strict: Some(true),
                },
            });
        }

        args.build().map_err(|e| self.provider_error(e))
    }
}

#[async_trait]
impl Network for LlmNetwork {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn instructions(&self) -> &str {
        &self.instructions
    }

    fn agents(&self) -> Vec<AgentSummary> {
        self.agents.iter().map(Agent::summary).collect()
    }

    fn routing_model(&self) -> ModelDescriptor {
        self.routing_model.clone()
    }

    #[instrument(
        skip(self, messages, options),
        fields(network_id = %self.id, model = %self.routing_model, thread_id = ?options.thread_id)
    )]
    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> NetworkResult<GenerateOutput> {
        let request = self.build_request(&messages, &options)?;
        debug!(message_count = messages.len(), "Sending completion request");

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| self.provider_error(e))?;

        let output = completion_output(&self.id, response, options.output.as_ref())?;
        info!(
            text_length = output.text.len(),
            finish_reason = ?output.finish_reason,
            "Network generation completed"
        );
        Ok(output)
    }

    #[instrument(
        skip(self, messages, options),
        fields(network_id = %self.id, model = %self.routing_model, thread_id = ?options.thread_id)
    )]
    async fn stream(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> NetworkResult<NetworkStream> {
        let mut request = self.build_request(&messages, &options)?;
        request.stream_options = Some(ChatCompletionStreamOptions {
            include_usage: true,
        });

        let upstream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| self.provider_error(e))?;

        Ok(relay_stream(upstream))
    }
}

/// Convert a completed chat response into the network's output.
///
/// With an output schema the reply text must parse as JSON; it is returned
/// both as text and as `object`.
fn completion_output(
    network_id: &str,
    response: CreateChatCompletionResponse,
    output: Option<&Value>,
) -> NetworkResult<GenerateOutput> {
    let (text, finish_reason) = match response.choices.into_iter().next() {
        Some(choice) => (
            choice.message.content.unwrap_or_default(),
            choice.finish_reason.map(convert_finish_reason),
        ),
        None => (String::new(), None),
    };

    let object = match output {
        Some(_) => Some(parse_object(&text)?),
        None => None,
    };

    Ok(GenerateOutput {
        network_id: network_id.to_string(),
        text,
        object,
        finish_reason,
        usage: response.usage.as_ref().map(convert_usage),
    })
}

fn parse_object(text: &str) -> NetworkResult<Value> {
    serde_json::from_str(text.trim()).map_err(|e| NetworkError::InvalidOutput(e.to_string()))
}

/// Map provider deltas to `text-delta` chunks.
///
/// A clean end of the upstream yields one `finish` chunk with the last
/// reported finish reason and usage. An upstream error ends the stream with
/// that error and no `finish`.
fn relay_stream<S>(upstream: S) -> NetworkStream
where
    S: Stream<Item = Result<CreateChatCompletionStreamResponse, OpenAIError>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut upstream = Box::pin(upstream);
        let mut finish_reason = None;
        let mut usage = None;
        let mut failed = false;

        while let Some(item) = upstream.next().await {
            match item {
                Ok(response) => {
                    if let Some(reported) = response.usage.as_ref() {
                        usage = Some(convert_usage(reported));
                    }
                    for choice in response.choices {
                        if let Some(delta) = choice.delta.content {
                            if !delta.is_empty() {
                                yield Ok(StreamChunk::text(delta));
                            }
                        }
                        if let Some(reason) = choice.finish_reason {
                            finish_reason = Some(convert_finish_reason(reason));
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Upstream stream failed");
                    failed = true;
                    yield Err(NetworkError::Stream(e.to_string()));
                    break;
                }
            }
        }

        if !failed {
            yield Ok(StreamChunk::Finish {
                finish_reason: finish_reason.unwrap_or(FinishReason::Stop),
                usage,
            });
        }
    };

    stream.boxed()
}

fn convert_finish_reason(reason: OpenAiFinishReason) -> FinishReason {
    match reason {
        OpenAiFinishReason::Stop => FinishReason::Stop,
        OpenAiFinishReason::Length => FinishReason::Length,
        OpenAiFinishReason::ContentFilter => FinishReason::ContentFilter,
        OpenAiFinishReason::ToolCalls | OpenAiFinishReason::FunctionCall => FinishReason::ToolCalls,
    }
}

fn convert_usage(usage: &CompletionUsage) -> Usage {
    Usage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_common::{AgentConfig, SystemConfig};
    use serde_json::json;

    const CONFIG: &str = r#"
[providers.local]
api_base = "http://localhost:11434/v1"

[[networks]]
name = "Research Network"
instructions = "Answer research questions."
routing_model = { provider = "local", model_id = "qwen2.5:7b" }
temperature = 0.3

[[networks.agents]]
name = "searcher"
instructions = "Find sources."
model = { provider = "local", model_id = "llama3.1:8b" }
"#;

    fn network() -> LlmNetwork {
        let config = SystemConfig::from_toml_str(CONFIG).unwrap();
        let clients = ProviderClients::from_config(&config.providers);
        LlmNetwork::from_config(&config.networks[0], &clients).unwrap()
    }

    #[test]
    fn test_from_config_exposes_descriptors() {
        let network = network();
        let summary = network.summary();
        assert_eq!(summary.id, "research-network");
        assert_eq!(summary.name, "Research Network");
        assert_eq!(summary.routing_model, ModelDescriptor::new("local", "qwen2.5:7b"));
        assert_eq!(summary.agents.len(), 1);
        assert_eq!(summary.agents[0].model_id, "llama3.1:8b");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = NetworkConfig {
            id: None,
            name: "Orphan".to_string(),
            instructions: String::new(),
            routing_model: ModelDescriptor::new("missing", "m"),
            temperature: None,
            agents: vec![AgentConfig {
                name: "a".to_string(),
                instructions: String::new(),
                model: ModelDescriptor::new("missing", "m"),
            }],
        };
        let result = LlmNetwork::from_config(&config, &ProviderClients::default());
        assert!(matches!(result, Err(NetworkError::Config(_))));
    }

    #[test]
    fn test_build_request_applies_options() {
        let network = network();
        let options = GenerateOptions {
            resource_id: Some("user-42".to_string()),
            output: Some(serde_json::json!({"type": "object"})),
            ..GenerateOptions::default()
        };
        let request = network
            .build_request(&[ChatMessage::user("hi")], &options)
            .unwrap();

        assert_eq!(request.model, "qwen2.5:7b");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.user.as_deref(), Some("user-42"));
        assert!(matches!(
            request.response_format,
            Some(ResponseFormat::JsonSchema { .. })
        ));
    }

    fn stream_response(content: Option<&str>, finish: Option<&str>) -> CreateChatCompletionStreamResponse {
        serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_700_000_000,
            "model": "qwen2.5:7b",
            "choices": [{
                "index": 0,
                "delta": {"content": content},
                "finish_reason": finish
            }]
        }))
        .unwrap()
    }

    fn usage_response() -> CreateChatCompletionStreamResponse {
        serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_700_000_000,
            "model": "qwen2.5:7b",
            "choices": [],
            "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
        }))
        .unwrap()
    }

    fn completion(content: &str) -> CreateChatCompletionResponse {
        serde_json::from_value(json!({
            "id": "chatcmpl-2",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "qwen2.5:7b",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "length"
            }],
            "usage": {"prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_relay_stream_emits_deltas_then_finish() {
        let upstream = futures::stream::iter(vec![
            Ok(stream_response(Some("Hel"), None)),
            Ok(stream_response(Some(""), None)),
            Ok(stream_response(Some("lo"), Some("stop"))),
            Ok(usage_response()),
        ]);

        let chunks: Vec<StreamChunk> = relay_stream(upstream)
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(
            chunks,
            vec![
                StreamChunk::text("Hel"),
                StreamChunk::text("lo"),
                StreamChunk::Finish {
                    finish_reason: FinishReason::Stop,
                    usage: Some(Usage {
                        prompt_tokens: 9,
                        completion_tokens: 3,
                        total_tokens: 12,
                    }),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_relay_stream_defaults_finish_reason() {
        let upstream = futures::stream::iter(vec![Ok(stream_response(Some("hi"), None))]);

        let chunks: Vec<NetworkResult<StreamChunk>> = relay_stream(upstream).collect().await;

        assert_eq!(chunks.len(), 2);
        assert!(matches!(
            chunks[1],
            Ok(StreamChunk::Finish {
                finish_reason: FinishReason::Stop,
                usage: None
            })
        ));
    }

    #[tokio::test]
    async fn test_relay_stream_ends_on_upstream_error() {
        let upstream = futures::stream::iter(vec![
            Ok(stream_response(Some("partial"), None)),
            Err(OpenAIError::StreamError("connection reset".to_string())),
            Ok(stream_response(Some("never sent"), Some("stop"))),
        ]);

        let chunks: Vec<NetworkResult<StreamChunk>> = relay_stream(upstream).collect().await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap(), &StreamChunk::text("partial"));
        match &chunks[1] {
            Err(NetworkError::Stream(reason)) => assert!(reason.contains("connection reset")),
            other => panic!("expected stream error, got {:?}", other),
        }
    }

    #[test]
    fn test_completion_output_without_schema() {
        let output = completion_output("research", completion("not json"), None).unwrap();

        assert_eq!(output.network_id, "research");
        assert_eq!(output.text, "not json");
        assert_eq!(output.object, None);
        assert_eq!(output.finish_reason, Some(FinishReason::Length));
        assert_eq!(output.usage.map(|u| u.total_tokens), Some(25));
    }

    #[test]
    fn test_completion_output_parses_object() {
        let schema = json!({"type": "object"});
        let output =
            completion_output("research", completion(r#"{"answer": 42}"#), Some(&schema)).unwrap();

        assert_eq!(output.object, Some(json!({"answer": 42})));
        assert_eq!(output.text, r#"{"answer": 42}"#);
    }

    #[test]
    fn test_completion_output_rejects_unparsable_object() {
        let schema = json!({"type": "object"});
        let result = completion_output("research", completion("The answer is 42."), Some(&schema));

        assert!(matches!(result, Err(NetworkError::InvalidOutput(_))));
    }
}
