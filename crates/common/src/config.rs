use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::types::{slugify, ModelDescriptor};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body, in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
    #[serde(default = "default_true")]
    pub cors_permissive: bool,
    /// Ambient runtime context applied to every request
    #[serde(default)]
    pub runtime_context: serde_json::Map<String, serde_json::Value>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit: default_body_limit(),
            cors_permissive: true,
            runtime_context: serde_json::Map::new(),
        }
    }
}

impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
    /// OTLP collector endpoint, only honoured with the `otel` feature
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
            otlp_endpoint: None,
        }
    }
}

/// An OpenAI-compatible completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_base: String,
    /// Name of the environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl ProviderConfig {
    /// Resolve the API key from the environment, if one is configured
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    pub routing_model: ModelDescriptor,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

impl NetworkConfig {
    /// Explicit id, or the slug of the network name
    pub fn resolved_id(&self) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => slugify(&self.name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    pub model: ModelDescriptor,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4111
}

fn default_body_limit() -> usize {
    10_000_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl SystemConfig {
    /// Load, parse and validate a TOML configuration file
    pub fn load_config(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");
        let content = std::fs::read_to_string(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to read configuration file");
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            networks = config.networks.len(),
            providers = config.providers.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> GatewayResult<Self> {
        let config: SystemConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GatewayResult<()> {
        if self.server.port == 0 {
            return Err(GatewayError::validation("server.port must be non-zero"));
        }
        if self.server.body_limit == 0 {
            return Err(GatewayError::validation("server.body_limit must be non-zero"));
        }

        let mut network_ids = HashSet::new();
        for network in &self.networks {
            if network.name.trim().is_empty() {
                return Err(GatewayError::validation("network name cannot be empty"));
            }

            let id = network.resolved_id();
            if id.is_empty() {
                return Err(GatewayError::validation(format!(
                    "network '{}' does not produce a usable id",
                    network.name
                )));
            }
            if !network_ids.insert(id.clone()) {
                return Err(GatewayError::validation(format!(
                    "duplicate network id '{}'",
                    id
                )));
            }

            if network.agents.is_empty() {
                return Err(GatewayError::validation(format!(
                    "network '{}' has no agents",
                    id
                )));
            }

            self.check_provider(&id, &network.routing_model)?;

            let mut agent_names = HashSet::new();
            for agent in &network.agents {
                if !agent_names.insert(agent.name.as_str()) {
                    return Err(GatewayError::validation(format!(
                        "network '{}' declares agent '{}' more than once",
                        id, agent.name
                    )));
                }
                self.check_provider(&id, &agent.model)?;
            }
        }

        Ok(())
    }

    fn check_provider(&self, network_id: &str, model: &ModelDescriptor) -> GatewayResult<()> {
        if self.providers.contains_key(&model.provider) {
            Ok(())
        } else {
            Err(GatewayError::validation(format!(
                "network '{}' references undeclared provider '{}'",
                network_id, model.provider
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[providers.openai]
api_base = "https://api.openai.com/v1"

[[networks]]
name = "Research Network"
routing_model = { provider = "openai", model_id = "gpt-4o" }

[[networks.agents]]
name = "researcher"
model = { provider = "openai", model_id = "gpt-4o-mini" }
"#;

    #[test]
    fn test_defaults_applied() {
        let config = SystemConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4111);
        assert_eq!(config.server.body_limit, 10_000_000);
        assert!(config.server.runtime_context.is_empty());
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.networks[0].resolved_id(), "research-network");
    }

    #[test]
    fn test_explicit_id_wins_over_name() {
        let text = MINIMAL.replace(
            "name = \"Research Network\"",
            "id = \"research\"\nname = \"Research Network\"",
        );
        let config = SystemConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.networks[0].resolved_id(), "research");
    }

    #[test]
    fn test_undeclared_provider_rejected() {
        let text = MINIMAL.replace("[providers.openai]", "[providers.local]");
        let err = SystemConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, GatewayError::ConfigValidation { .. }));
        assert!(err.to_string().contains("undeclared provider 'openai'"));
    }

    #[test]
    fn test_network_without_agents_rejected() {
        let text = r#"
[providers.openai]
api_base = "https://api.openai.com/v1"

[[networks]]
name = "Empty"
routing_model = { provider = "openai", model_id = "gpt-4o" }
"#;
        let err = SystemConfig::from_toml_str(text).unwrap_err();
        assert!(err.to_string().contains("has no agents"));
    }

    #[test]
    fn test_zero_port_rejected() {
        let text = format!("[server]\nport = 0\n{}", MINIMAL);
        assert!(SystemConfig::from_toml_str(&text).is_err());
    }
}
