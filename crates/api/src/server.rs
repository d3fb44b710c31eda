use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use gateway_common::{ServerConfig, SystemConfig};
use gateway_network::{NetworkRegistry, RuntimeContext};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, instrument};
use utoipa::OpenApi;

use crate::{
    middleware::{get_tracing_layer, logging_middleware, runtime_context_middleware},
    openapi::ApiDoc,
    routes,
    types::HealthResponse,
};

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<NetworkRegistry>,
    /// Ambient runtime context configured for the server
    pub default_context: Arc<RuntimeContext>,
}

impl AppState {
    pub fn new(registry: NetworkRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            default_context: Arc::new(RuntimeContext::new()),
        }
    }

    pub fn with_default_context(mut self, context: RuntimeContext) -> Self {
        self.default_context = Arc::new(context);
        self
    }
}

pub struct GatewayServer {
    config: ServerConfig,
    state: AppState,
}

impl GatewayServer {
    /// Build the registry from configuration and prepare the server
    pub fn new(config: SystemConfig) -> Result<Self> {
        let registry =
            NetworkRegistry::from_config(&config).context("Failed to build network registry")?;
        Ok(Self::with_registry(config.server, registry))
    }

    pub fn with_registry(config: ServerConfig, registry: NetworkRegistry) -> Self {
        let state = AppState::new(registry)
            .with_default_context(RuntimeContext::from_map(config.runtime_context.clone()));
        Self { config, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        let cors = if self.config.cors_permissive {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        };

        build_router(self.state.clone())
            .layer(DefaultBodyLimit::max(self.config.body_limit))
            .layer(cors)
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> Result<()> {
        let addr = self.config.to_string();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!(
            addr = %addr,
            networks = self.state.registry.len(),
            "Network gateway listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        info!("Network gateway stopped");
        Ok(())
    }
}

/// Routes and per-request middleware, without transport-level limits
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/networks", get(routes::networks::list_networks))
        .route(
            "/api/networks/",
            get(routes::networks::get_network_without_id),
        )
        .route(
            "/api/networks/:network_id",
            get(routes::networks::get_network_by_id),
        )
        .route(
            "/api/networks/:network_id/generate",
            post(routes::networks::generate),
        )
        .route(
            "/api/networks/:network_id/stream",
            post(routes::networks::stream),
        )
        .route("/api-doc/openapi.json", get(openapi_json))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            runtime_context_middleware,
        ))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(get_tracing_layer())
        .with_state(state)
}

/// Report server liveness
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: Some(format!("{} networks registered", state.registry.len())),
        timestamp: Utc::now(),
    })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
