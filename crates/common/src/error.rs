use thiserror::Error;

/// Failures raised while configuring or bootstrapping the gateway
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("Configuration validation failed: {details}")]
    ConfigValidation { details: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

impl GatewayError {
    /// Create a configuration validation error
    pub fn validation(details: impl Into<String>) -> Self {
        Self::ConfigValidation {
            details: details.into(),
        }
    }

    /// Create a telemetry setup error
    pub fn telemetry(msg: impl Into<String>) -> Self {
        Self::Telemetry(msg.into())
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
