// src/core/config.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "tablesim.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub max_request_bytes: usize,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            max_request_bytes: 1024 * 1024,
            timeout_secs: 30,
        }
    }
}

/// Naming overrides for relation inference.
///
/// Both maps extend the built-in irregular names rather than replacing them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationConfig {
    /// Model name (any case) to table name.
    pub models: IndexMap<String, String>,
    /// Table name to the foreign key other tables use to point at it.
    pub foreign_keys: IndexMap<String, String>,
}

impl RelationConfig {
    /// Built-in model map merged with the configured one, keys lowercased.
    pub fn model_table_map(&self) -> IndexMap<String, String> {
        let mut map: IndexMap<String, String> = [
            ("product", "products"),
            ("brand", "brands"),
            ("category", "categories"),
            ("supplier", "suppliers"),
            ("user", "users"),
            ("post", "posts"),
        ]
        .into_iter()
        .map(|(m, t)| (m.to_string(), t.to_string()))
        .collect();
        for (model, table) in &self.models {
            map.insert(model.to_lowercase(), table.clone());
        }
        map
    }

    /// Built-in irregular foreign keys merged with the configured ones.
    pub fn foreign_key_map(&self) -> IndexMap<String, String> {
        let mut map: IndexMap<String, String> = [
            ("categories", "category_id"),
            ("companies", "company_id"),
            ("countries", "country_id"),
        ]
        .into_iter()
        .map(|(t, k)| (t.to_string(), k.to_string()))
        .collect();
        for (table, key) in &self.foreign_keys {
            map.insert(table.clone(), key.clone());
        }
        map
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub server: ServerConfig,
    pub relations: RelationConfig,
}

impl SandboxConfig {
    /// Load `tablesim.toml` from the working directory, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from(DEFAULT_CONFIG_PATH) {
            Ok(config) => config,
            Err(ConfigError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring {}: {}", DEFAULT_CONFIG_PATH, e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Contents written by `tablesim init`.
    pub fn default_toml() -> String {
        r#"[server]
port = 8080
max_request_bytes = 1048576
timeout_secs = 30

# Model name (any case) -> table name
[relations.models]

# Table name -> foreign key pointing at it
[relations.foreign_keys]
"#
        .to_string()
    }
}
