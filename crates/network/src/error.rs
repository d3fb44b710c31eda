use thiserror::Error;

/// Failures raised by a network while generating or streaming
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NetworkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network '{0}' is already registered")]
    DuplicateNetwork(String),

    #[error("Provider error: {provider}: {reason}")]
    Provider { provider: String, reason: String },

    #[error("Model returned invalid structured output: {0}")]
    InvalidOutput(String),

    #[error("Stream interrupted: {0}")]
    Stream(String),
}

impl NetworkError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider error
    pub fn provider(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::Provider {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }
}

pub type NetworkResult<T> = std::result::Result<T, NetworkError>;
