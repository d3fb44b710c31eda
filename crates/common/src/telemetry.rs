//! Tracing subscriber setup shared by every gateway binary

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::TelemetryConfig;
use crate::error::{GatewayError, GatewayResult};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. Fails if a
/// subscriber has already been installed for this process.
pub fn init_tracing(config: &TelemetryConfig) -> GatewayResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            GatewayError::telemetry(format!("invalid log level '{}': {}", config.log_level, e))
        })?;

    let (json_layer, text_layer) = if config.json {
        (Some(fmt::layer().json().with_target(true)), None)
    } else {
        (
            None,
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false),
            ),
        )
    };

    let registry = Registry::default()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer);

    #[cfg(feature = "otel")]
    let registry = registry.with(otel::layer(config)?);

    registry
        .try_init()
        .map_err(|e| GatewayError::telemetry(e.to_string()))?;

    info!(level = %config.log_level, json = config.json, "Tracing initialized");
    Ok(())
}

/// Convenience wrapper used by CLI entry points that only know a level
pub fn init_tracing_with_level(level: &str) -> GatewayResult<()> {
    init_tracing(&TelemetryConfig {
        log_level: level.to_string(),
        ..TelemetryConfig::default()
    })
}

/// Flush and stop any exporter installed by [`init_tracing`]
pub fn shutdown_tracer() {
    #[cfg(feature = "otel")]
    otel::shutdown();
}

#[cfg(feature = "otel")]
mod otel {
    use once_cell::sync::Lazy;
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::{runtime, trace::TracerProvider, Resource};
    use std::sync::Mutex;
    use tracing::{info, warn, Subscriber};
    use tracing_opentelemetry::OpenTelemetryLayer;
    use tracing_subscriber::registry::LookupSpan;

    use crate::config::TelemetryConfig;
    use crate::error::{GatewayError, GatewayResult};

    const SERVICE_NAME: &str = "network-gateway";

    static TRACER_PROVIDER: Lazy<Mutex<Option<TracerProvider>>> = Lazy::new(|| Mutex::new(None));

    pub(super) fn layer<S>(
        config: &TelemetryConfig,
    ) -> GatewayResult<Option<OpenTelemetryLayer<S, opentelemetry_sdk::trace::Tracer>>>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let Some(endpoint) = config.otlp_endpoint.as_deref() else {
            return Ok(None);
        };

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()
            .map_err(|e| GatewayError::telemetry(e.to_string()))?;

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .with_resource(Resource::new(vec![
                KeyValue::new("service.name", SERVICE_NAME),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            ]))
            .build();

        let tracer = provider.tracer(SERVICE_NAME);
        opentelemetry::global::set_tracer_provider(provider.clone());
        if let Ok(mut slot) = TRACER_PROVIDER.lock() {
            *slot = Some(provider);
        }

        info!(endpoint, "OpenTelemetry exporting spans");
        Ok(Some(tracing_opentelemetry::layer().with_tracer(tracer)))
    }

    pub(super) fn shutdown() {
        let provider = TRACER_PROVIDER.lock().ok().and_then(|mut slot| slot.take());
        if let Some(provider) = provider {
            if let Err(e) = provider.shutdown() {
                warn!(error = %e, "Error shutting down tracer provider");
            }
        }
    }
}
