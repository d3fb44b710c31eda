use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tower_http::{classify::{ServerErrorsAsFailures, SharedClassifier}, trace::TraceLayer};
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Default `tower-http` trace layer for the gateway router
pub fn get_tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// Tag each request with an id and log its outcome and latency.
///
/// A client-supplied `x-request-id` is kept; otherwise a UUID is generated.
/// The id is echoed back on the response. Requests under `/api/networks/`
/// carry the network id on their span.
pub async fn logging_middleware(mut request: Request, next: Next) -> Response {
    let started = Instant::now();

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let echoed = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = &echoed {
        request.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let network_id = network_id_from_path(&path).unwrap_or_default().to_string();

    let span = info_span!(
        "gateway_request",
        request_id = %request_id,
        method = %method,
        path = %path,
        network_id = %network_id,
    );

    let mut response = async move {
        debug!("Request received");
        next.run(request).await
    }
    .instrument(span.clone())
    .await;

    if let Some(value) = echoed {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    span.in_scope(|| log_outcome(response.status(), started.elapsed()));
    response
}

fn log_outcome(status: StatusCode, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match status.as_u16() {
        500..=599 => error!(status = status.as_u16(), elapsed_ms, "Request failed"),
        400..=499 => warn!(status = status.as_u16(), elapsed_ms, "Request rejected"),
        _ => debug!(status = status.as_u16(), elapsed_ms, "Request completed"),
    }
}

/// `/api/networks/{id}[/...]` → `id`
fn network_id_from_path(path: &str) -> Option<&str> {
    path.strip_prefix("/api/networks/")?
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_id_from_path() {
        assert_eq!(network_id_from_path("/api/networks/research"), Some("research"));
        assert_eq!(
            network_id_from_path("/api/networks/research/generate"),
            Some("research")
        );
        assert_eq!(network_id_from_path("/api/networks"), None);
        assert_eq!(network_id_from_path("/api/networks/"), None);
        assert_eq!(network_id_from_path("/health"), None);
    }
}
