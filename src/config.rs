//! Configuration loading.
//!
//! Settings live in a TOML file:
//!
//! ```toml
//! [provider]
//! base_url = "https://myproject.supabase.co"
//! anon_key = "eyJ..."
//!
//! [flow]
//! country_code = "+91"
//! redirect_url = "http://localhost:3000"
//! federated_provider = "google"
//! ```
//!
//! Every field has a default, so a missing file or a partial file both
//! produce a usable configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::flow::state::FlowSettings;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub provider: ProviderSettings,
    pub flow: FlowSettings,
}

/// Connection settings for the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Project base URL, without the /auth/v1 suffix.
    pub base_url: String,
    /// Publishable anon key sent with every request.
    pub anon_key: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9999".to_string(),
            anon_key: String::new(),
        }
    }
}

impl AuthConfig {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
