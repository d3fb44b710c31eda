//! OpenAPI Specification Configuration
//!
//! The document is generated from route annotations with utoipa and served
//! at `/api-doc/openapi.json`.

use serde::Serialize;
use utoipa::ToSchema;

use crate::types::*;

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Agent Network Gateway API",
        description = "
HTTP surface for multi-agent networks.

A network is a named group of agents behind a routing model. Clients list
networks, fetch one by id, and run synchronous or streaming generations.

## Runtime context

Every call carries a runtime context: the server's configured defaults,
overlaid with the `x-runtime-context` header (a JSON object), overlaid with
the `runtimeContext` field of the request body.

## Errors

- 404 `Network not found`: unknown or missing network id
- 400 `Argument \"messages\" is required`: request without `messages`
        ",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::routes::networks::list_networks,
        crate::routes::networks::get_network_by_id,
        crate::routes::networks::generate,
        crate::routes::networks::stream,
        crate::server::health_check
    ),
    components(schemas(
        GenerateRequest,
        HealthResponse,
        ErrorResponse,
        NetworkSummaryDoc,
        AgentSummaryDoc,
        ModelDescriptorDoc,
        GenerateOutputDoc
    )),
    tags(
        (name = "networks", description = "Network discovery and generation"),
        (name = "health", description = "System health and status")
    )
)]
pub struct ApiDoc;

/// Model on a configured provider
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptorDoc {
    #[schema(example = "openai")]
    pub provider: String,
    #[schema(example = "gpt-4o")]
    pub model_id: String,
}

/// Agent participating in a network
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummaryDoc {
    #[schema(example = "searcher")]
    pub name: String,
    pub instructions: String,
    pub provider: String,
    pub model_id: String,
}

/// Network listing entry
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummaryDoc {
    #[schema(example = "research-network")]
    pub id: String,
    #[schema(example = "Research Network")]
    pub name: String,
    pub instructions: String,
    pub agents: Vec<AgentSummaryDoc>,
    pub routing_model: ModelDescriptorDoc,
}

/// Result of a synchronous generation
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutputDoc {
    pub network_id: String,
    pub text: String,
    /// Parsed structured output, present when `experimental_output` was sent
    #[schema(value_type = Option<Object>)]
    pub object: Option<serde_json::Value>,
    #[schema(example = "stop")]
    pub finish_reason: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub usage: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_document_lists_network_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/networks"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/networks/{network_id}/generate"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/networks/{network_id}/stream"));

        let schemas = &doc.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("ErrorResponse"));
    }
}
