//! Network handlers
//!
//! Transport-independent handler logic: resolve a network, validate the
//! request, merge runtime contexts and delegate. Validation order is fixed:
//! the network is resolved before the body is inspected.

use gateway_network::{
    ChatMessage, GenerateOptions, GenerateOutput, MessageInput, Network, NetworkStream,
    NetworkSummary, RuntimeContext,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::{
    error::{ApiError, ApiResult},
    server::AppState,
    types::GenerateRequest,
};

/// Every registered network, in registration order
pub fn list_networks(state: &AppState) -> Vec<NetworkSummary> {
    state.registry.summaries()
}

pub fn get_network_by_id(state: &AppState, network_id: Option<&str>) -> ApiResult<NetworkSummary> {
    resolve_network(state, network_id).map(|network| network.summary())
}

/// Exact-match lookup; a missing id is reported the same way as an unknown one
pub fn resolve_network(state: &AppState, network_id: Option<&str>) -> ApiResult<Arc<dyn Network>> {
    let network_id = network_id.ok_or_else(ApiError::network_not_found)?;
    state.registry.get(network_id).ok_or_else(|| {
        debug!(network_id, "Network lookup failed");
        ApiError::network_not_found()
    })
}

#[instrument(skip(state, ambient, request))]
pub async fn generate(
    state: &AppState,
    network_id: Option<&str>,
    ambient: &RuntimeContext,
    request: GenerateRequest,
) -> ApiResult<GenerateOutput> {
    let (network, messages, options) = prepare_call(state, network_id, ambient, request)?;

    let output = network.generate(messages, options).await.map_err(|e| {
        error!(network_id = network.id(), error = %e, "Network generation failed");
        ApiError::internal(format!("Error generating from network: {}", e))
            .with_code("GENERATION_FAILED")
    })?;

    info!(network_id = network.id(), text_length = output.text.len(), "Generation completed");
    Ok(output)
}

#[instrument(skip(state, ambient, request))]
pub async fn stream(
    state: &AppState,
    network_id: Option<&str>,
    ambient: &RuntimeContext,
    request: GenerateRequest,
) -> ApiResult<NetworkStream> {
    let (network, messages, options) = prepare_call(state, network_id, ambient, request)?;

    let stream = network.stream(messages, options).await.map_err(|e| {
        error!(network_id = network.id(), error = %e, "Network stream failed to start");
        ApiError::internal(format!("Error streaming from network: {}", e))
            .with_code("STREAM_FAILED")
    })?;

    info!(network_id = network.id(), "Stream started");
    Ok(stream)
}

fn prepare_call(
    state: &AppState,
    network_id: Option<&str>,
    ambient: &RuntimeContext,
    request: GenerateRequest,
) -> ApiResult<(Arc<dyn Network>, Vec<ChatMessage>, GenerateOptions)> {
    let network = resolve_network(state, network_id)?;

    let GenerateRequest {
        messages,
        resource_id,
        thread_id,
        experimental_output,
        runtime_context,
    } = request;

    let messages = messages
        .filter(|input| !matches!(input, MessageInput::Text(text) if text.is_empty()))
        .ok_or_else(ApiError::messages_required)?
        .into_messages();

    let runtime_context = ambient.merged_with(runtime_context.as_ref());
    debug!(
        network_id = network.id(),
        message_count = messages.len(),
        context_keys = runtime_context.len(),
        "Delegating to network"
    );

    let options = GenerateOptions {
        runtime_context,
        resource_id,
        thread_id,
        output: experimental_output,
    };

    Ok((network, messages, options))
}
