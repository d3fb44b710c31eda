use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a model on a configured provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub provider: String,
    #[serde(rename = "modelId", alias = "model_id")]
    pub model_id: String,
}

impl ModelDescriptor {
    pub fn new(provider: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model_id: model_id.into(),
        }
    }
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model_id)
    }
}

/// Turn a display name into a URL-safe identifier.
///
/// ASCII alphanumerics are lowercased and kept; every other run of
/// characters collapses into a single `-`. Leading and trailing separators
/// are dropped, so `"  Research Network!"` becomes `"research-network"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
