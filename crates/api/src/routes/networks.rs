//! HTTP routes for network listing, lookup, generation and streaming

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures::{Stream, StreamExt};
use gateway_network::{GenerateOutput, NetworkResult, NetworkSummary, RuntimeContext, StreamChunk};
use std::convert::Infallible;
use tracing::{instrument, warn};

use crate::{
    error::{ApiError, ApiResult},
    handlers,
    middleware::AmbientContext,
    server::AppState,
    types::GenerateRequest,
};

/// List every registered network
#[utoipa::path(
    get,
    path = "/api/networks",
    tag = "networks",
    responses(
        (status = 200, description = "Registered networks", body = [crate::openapi::NetworkSummaryDoc])
    )
)]
#[instrument(skip(state))]
pub async fn list_networks(State(state): State<AppState>) -> Json<Vec<NetworkSummary>> {
    Json(handlers::networks::list_networks(&state))
}

/// Fetch one network by id
#[utoipa::path(
    get,
    path = "/api/networks/{network_id}",
    tag = "networks",
    params(("network_id" = String, Path, description = "Network identifier")),
    responses(
        (status = 200, description = "Network found", body = crate::openapi::NetworkSummaryDoc),
        (status = 404, description = "Network not found", body = crate::types::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_network_by_id(
    State(state): State<AppState>,
    Path(network_id): Path<String>,
) -> ApiResult<Json<NetworkSummary>> {
    handlers::networks::get_network_by_id(&state, Some(&network_id)).map(Json)
}

/// `GET /api/networks/` with an empty id
#[instrument(skip(state))]
pub async fn get_network_without_id(State(state): State<AppState>) -> ApiResult<Json<NetworkSummary>> {
    handlers::networks::get_network_by_id(&state, None).map(Json)
}

/// Run a synchronous generation
///
/// The effective runtime context is the ambient context (server defaults
/// plus the `x-runtime-context` header) overlaid with `runtimeContext` from
/// the body.
#[utoipa::path(
    post,
    path = "/api/networks/{network_id}/generate",
    tag = "networks",
    params(("network_id" = String, Path, description = "Network identifier")),
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generation result", body = crate::openapi::GenerateOutputDoc),
        (status = 400, description = "Missing messages or malformed body", body = crate::types::ErrorResponse),
        (status = 404, description = "Network not found", body = crate::types::ErrorResponse),
        (status = 500, description = "Network failed", body = crate::types::ErrorResponse)
    )
)]
#[instrument(skip(state, ambient, body))]
pub async fn generate(
    State(state): State<AppState>,
    Path(network_id): Path<String>,
    Extension(ambient): Extension<AmbientContext>,
    body: Bytes,
) -> ApiResult<Json<GenerateOutput>> {
    let ambient = ambient_context(&state, &network_id, ambient)?;
    let request = parse_generate_body(&state, &network_id, &body)?;
    handlers::networks::generate(&state, Some(&network_id), &ambient, request)
        .await
        .map(Json)
}

/// Run a streaming generation as Server-Sent Events
///
/// Each event carries one JSON chunk: `text-delta`, then a final `finish`
/// (or `error` if the network fails mid-stream).
#[utoipa::path(
    post,
    path = "/api/networks/{network_id}/stream",
    tag = "networks",
    params(("network_id" = String, Path, description = "Network identifier")),
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "text/event-stream of JSON chunks"),
        (status = 400, description = "Missing messages or malformed body", body = crate::types::ErrorResponse),
        (status = 404, description = "Network not found", body = crate::types::ErrorResponse),
        (status = 500, description = "Network failed", body = crate::types::ErrorResponse)
    )
)]
#[instrument(skip(state, ambient, body))]
pub async fn stream(
    State(state): State<AppState>,
    Path(network_id): Path<String>,
    Extension(ambient): Extension<AmbientContext>,
    body: Bytes,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let ambient = ambient_context(&state, &network_id, ambient)?;
    let request = parse_generate_body(&state, &network_id, &body)?;
    let chunks = handlers::networks::stream(&state, Some(&network_id), &ambient, request).await?;

    let events = chunks.map(|chunk| Ok::<_, Infallible>(chunk_to_event(chunk)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Unwrap the ambient context, deferring a malformed header behind lookup
fn ambient_context(
    state: &AppState,
    network_id: &str,
    ambient: AmbientContext,
) -> ApiResult<RuntimeContext> {
    ambient
        .into_context()
        .map_err(|invalid| unless_network_unknown(state, network_id, invalid))
}

/// Parse the request body, treating an empty body as `{}`
fn parse_generate_body(state: &AppState, network_id: &str, body: &[u8]) -> ApiResult<GenerateRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateRequest::default());
    }

    serde_json::from_slice::<GenerateRequest>(body).map_err(|e| {
        warn!(error = %e, line = e.line(), column = e.column(), "Malformed request body");
        let invalid = ApiError::bad_request(format!(
            "Invalid JSON at line {}, column {}: {}",
            e.line(),
            e.column(),
            e
        ))
        .with_code("INVALID_JSON");
        unless_network_unknown(state, network_id, invalid)
    })
}

/// Request errors are only reported once the network is known to exist, so
/// an unknown network always yields 404.
fn unless_network_unknown(state: &AppState, network_id: &str, error: ApiError) -> ApiError {
    match handlers::networks::resolve_network(state, Some(network_id)) {
        Err(not_found) => not_found,
        Ok(_) => error,
    }
}

fn chunk_to_event(chunk: NetworkResult<StreamChunk>) -> Event {
    let chunk = chunk.unwrap_or_else(|e| {
        warn!(error = %e, "Network stream yielded an error");
        StreamChunk::Error {
            message: e.to_string(),
        }
    });

    Event::default()
        .event(chunk.event_name())
        .json_data(&chunk)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}
