//! Entrypoints configuration document.
//!
//! ```json
//! {
//!   "entrypoints": {
//!     "giga-max-2": {"key": "giga-max-2", "name": "gigachat", "caption": "Gigachat", "args": {}}
//!   },
//!   "default_entrypoint_key": "giga-max-2",
//!   "warmup": false
//! }
//! ```

use crate::backend::Capability;
use crate::error::ConfigError;
use rootcause::Report;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::path::Path;

/// One configured provider/model combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrypointConfig {
    /// Unique key.
    pub key: String,
    /// Provider name, e.g. `gigachat` or `open-router`.
    pub name: String,
    /// Human-readable caption.
    #[serde(default)]
    pub caption: String,
    /// Provider-specific arguments.
    #[serde(default)]
    pub args: Map<String, JsonValue>,
}

/// The full set of configured entrypoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntrypointsConfig {
    #[serde(default)]
    pub entrypoints: BTreeMap<String, EntrypointConfig>,
    #[serde(default)]
    pub default_entrypoint_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_image_entrypoint_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_file_entrypoint_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_embedding_entrypoint_key: String,
    #[serde(default)]
    pub warmup: bool,
}

impl EntrypointsConfig {
    /// Builds a configuration from entries, keyed by each entry's key.
    #[must_use]
    pub fn from_entries(
        entries: impl IntoIterator<Item = EntrypointConfig>,
        default_entrypoint_key: impl Into<String>,
    ) -> Self {
        Self {
            entrypoints: entries.into_iter().map(|e| (e.key.clone(), e)).collect(),
            default_entrypoint_key: default_entrypoint_key.into(),
            ..Self::default()
        }
    }

    /// Reads and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid
    /// document, or names a default key that is not configured.
    pub fn load(path: &Path) -> Result<Self, Report<ConfigError>> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&text).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
        .map_err(Report::from)
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid document.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every non-empty default key is configured.
    ///
    /// # Errors
    ///
    /// Returns the first default key that is missing from the map.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let defaults = [
            ("default_entrypoint_key", &self.default_entrypoint_key),
            ("default_image_entrypoint_key", &self.default_image_entrypoint_key),
            ("default_file_entrypoint_key", &self.default_file_entrypoint_key),
            (
                "default_embedding_entrypoint_key",
                &self.default_embedding_entrypoint_key,
            ),
        ];
        for (field, key) in defaults {
            if !key.is_empty() && !self.entrypoints.contains_key(key) {
                return Err(ConfigError::DefaultKeyMissing {
                    field,
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Returns the default key for a capability.
    ///
    /// Capabilities without their own default use `default_entrypoint_key`.
    #[must_use]
    pub fn default_key_for(&self, capability: Capability) -> &str {
        let specific = match capability {
            Capability::Text => "",
            Capability::Image => &self.default_image_entrypoint_key,
            Capability::File => &self.default_file_entrypoint_key,
            Capability::Embedding => &self.default_embedding_entrypoint_key,
        };
        if specific.is_empty() {
            &self.default_entrypoint_key
        } else {
            specific
        }
    }

    /// Serializes the document as indented JSON.
    #[must_use]
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// A listing entry for one entrypoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrypointInfo {
    pub entrypoint_key: String,
    pub caption: String,
}

/// Public view of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrypointsInfo {
    pub default_entrypoint_key: String,
    pub entrypoints: Vec<EntrypointInfo>,
}

impl From<&EntrypointsConfig> for EntrypointsInfo {
    fn from(config: &EntrypointsConfig) -> Self {
        Self {
            default_entrypoint_key: config.default_entrypoint_key.clone(),
            entrypoints: config
                .entrypoints
                .values()
                .map(|e| EntrypointInfo {
                    entrypoint_key: e.key.clone(),
                    caption: e.caption.clone(),
                })
                .collect(),
        }
    }
}
