//! Agents participating in a network

use gateway_common::{AgentConfig, ModelDescriptor};
use serde::{Deserialize, Serialize};

/// Listing representation of an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub name: String,
    pub instructions: String,
    pub provider: String,
    pub model_id: String,
}

/// An individually configured, model-backed participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    name: String,
    instructions: String,
    model: ModelDescriptor,
}

impl Agent {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>, model: ModelDescriptor) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn model(&self) -> &ModelDescriptor {
        &self.model
    }

    pub fn summary(&self) -> AgentSummary {
        AgentSummary {
            name: self.name.clone(),
            instructions: self.instructions.clone(),
            provider: self.model.provider.clone(),
            model_id: self.model.model_id.clone(),
        }
    }
}

impl From<&AgentConfig> for Agent {
    fn from(config: &AgentConfig) -> Self {
        Self::new(&config.name, &config.instructions, config.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_wire_format() {
        let agent = Agent::new("searcher", "Find sources", ModelDescriptor::new("openai", "gpt-4o-mini"));
        assert_eq!(
            serde_json::to_value(agent.summary()).unwrap(),
            json!({
                "name": "searcher",
                "instructions": "Find sources",
                "provider": "openai",
                "modelId": "gpt-4o-mini"
            })
        );
    }
}
