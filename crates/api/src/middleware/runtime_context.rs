//! Ambient runtime context for each request

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use gateway_network::RuntimeContext;
use tracing::{debug, warn};

use crate::{error::ApiError, server::AppState};

/// Header carrying a JSON object of runtime context values
pub const RUNTIME_CONTEXT_HEADER: &str = "x-runtime-context";

/// Ambient context as built by [`runtime_context_middleware`].
///
/// A malformed header is kept as an error instead of failing the request, so
/// routes can report it after resolving the network and routes that ignore
/// the context are unaffected.
#[derive(Debug, Clone)]
pub struct AmbientContext(Result<RuntimeContext, String>);

impl AmbientContext {
    pub fn into_context(self) -> Result<RuntimeContext, ApiError> {
        self.0.map_err(|reason| {
            ApiError::bad_request(format!(
                "Header '{}' must be a JSON object: {}",
                RUNTIME_CONTEXT_HEADER, reason
            ))
            .with_code("INVALID_RUNTIME_CONTEXT")
        })
    }
}

/// Build the [`AmbientContext`] and store it in request extensions.
///
/// Starts from the server defaults and overlays the `x-runtime-context`
/// header when present.
pub async fn runtime_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut context = state.default_context.as_ref().clone();

    let ambient = match request.headers().get(RUNTIME_CONTEXT_HEADER) {
        None => Ok(context),
        Some(raw) => raw
            .to_str()
            .map_err(|e| e.to_string())
            .and_then(|text| RuntimeContext::from_json_str(text).map_err(|e| e.to_string()))
            .map(|header_context| {
                debug!(keys = header_context.len(), "Runtime context supplied by header");
                context.extend(header_context.as_map());
                context
            })
            .inspect_err(|e| warn!(error = %e, "Malformed runtime context header")),
    };

    request.extensions_mut().insert(AmbientContext(ambient));
    next.run(request).await
}
