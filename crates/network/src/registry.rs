//! Registry of the networks exposed by the gateway

use gateway_common::SystemConfig;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{NetworkError, NetworkResult};
use crate::llm::{LlmNetwork, ProviderClients};
use crate::network::{Network, NetworkSummary};

/// Insertion-ordered set of networks keyed by id.
///
/// Built once at start-up and shared read-only afterwards.
#[derive(Clone, Default)]
pub struct NetworkRegistry {
    networks: Vec<Arc<dyn Network>>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one [`LlmNetwork`] per configured network
    pub fn from_config(config: &SystemConfig) -> NetworkResult<Self> {
        let clients = ProviderClients::from_config(&config.providers);
        let mut registry = Self::new();
        for network_config in &config.networks {
            let network = LlmNetwork::from_config(network_config, &clients)?;
            registry.register(Arc::new(network))?;
        }
        info!(networks = registry.len(), "Network registry built");
        Ok(registry)
    }

    pub fn register(&mut self, network: Arc<dyn Network>) -> NetworkResult<()> {
        if self.get(network.id()).is_some() {
            return Err(NetworkError::DuplicateNetwork(network.id().to_string()));
        }
        debug!(network_id = network.id(), name = network.name(), "Registering network");
        self.networks.push(network);
        Ok(())
    }

    /// Exact-match lookup by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn Network>> {
        self.networks
            .iter()
            .find(|network| network.id() == id)
            .cloned()
    }

    pub fn summaries(&self) -> Vec<NetworkSummary> {
        self.networks.iter().map(|network| network.summary()).collect()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl std::fmt::Debug for NetworkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.networks.iter().map(|network| network.id()))
            .finish()
    }
}
