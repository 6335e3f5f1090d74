//! Named client configuration fixtures.
//!
//! Tests resolve a symbolic name to ready-to-use [`ClientSettings`] instead of
//! repeating connection parameters inline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Connection settings for one client under test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientSettings {
    /// Base URL of the service the client would talk to
    #[serde(default)]
    pub base_url: String,

    /// Basic-auth user name
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password
    #[serde(default)]
    pub password: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClientSettings {
    /// Validate the settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url cannot be empty");
        }
        if self.password.is_some() && self.username.is_none() {
            anyhow::bail!("password set without a username");
        }
        Ok(())
    }
}

/// Error from resolving a named configuration fixture.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested name is not in the store.
    #[error("unknown client configuration '{0}'")]
    NotFound(String),
}

/// A store of named client settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigStore {
    /// Named client settings
    #[serde(default)]
    pub clients: HashMap<String, ClientSettings>,
}

impl ConfigStore {
    /// Load a store from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let store: Self = serde_yaml::from_str(&content)?;
        store.validate()?;
        debug!(path = ?path, clients = store.clients.len(), "loaded client configurations");
        Ok(store)
    }

    /// Parse a store from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Validate every entry in the store.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, settings) in &self.clients {
            settings
                .validate()
                .map_err(|e| anyhow::anyhow!("client '{}': {}", name, e))?;
        }
        Ok(())
    }

    /// Resolve a named fixture to its settings.
    pub fn resolve(&self, name: &str) -> Result<&ClientSettings, ConfigError> {
        self.clients
            .get(name)
            .ok_or_else(|| ConfigError::NotFound(name.to_string()))
    }
}
