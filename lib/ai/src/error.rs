//! Error types for the AI crate.
//!
//! - `LlmError`: Provider resolution and call failures
//! - `ConfigError`: Problems with the entrypoints configuration document

use crate::backend::Capability;
use std::fmt;

/// Errors from provider resolution and provider calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Neither the requested nor the default key resolved.
    EntrypointNotFound {
        key: String,
        default_key: String,
        capability: Option<Capability>,
    },
    /// The provider does not implement the requested operation.
    Unsupported {
        provider: String,
        capability: Capability,
    },
    /// Provider is temporarily unavailable (timeout, 5xx, rate limit).
    ProviderUnavailable { provider: String, reason: String },
    /// Request was rejected by the provider.
    RequestFailed { provider: String, reason: String },
    /// Response parsing failed.
    ResponseParseFailed { provider: String, reason: String },
    /// Entrypoint arguments are invalid.
    InvalidConfig { key: String, reason: String },
    /// The request shape cannot be served.
    BadRequest { reason: String },
    /// Every attempt failed or returned an unacceptable result.
    RetriesExhausted {
        title: String,
        attempts: u32,
        last_error: Option<String>,
    },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntrypointNotFound {
                key,
                default_key,
                capability,
            } => {
                write!(f, "no entrypoint for key '{key}' or default '{default_key}'")?;
                if let Some(capability) = capability {
                    write!(f, " with capability {capability}")?;
                }
                Ok(())
            }
            Self::Unsupported {
                provider,
                capability,
            } => write!(f, "provider '{provider}' does not support {capability}"),
            Self::ProviderUnavailable { provider, reason } => {
                write!(f, "LLM provider '{provider}' unavailable: {reason}")
            }
            Self::RequestFailed { provider, reason } => {
                write!(f, "LLM request to '{provider}' failed: {reason}")
            }
            Self::ResponseParseFailed { provider, reason } => {
                write!(f, "failed to parse response from '{provider}': {reason}")
            }
            Self::InvalidConfig { key, reason } => {
                write!(f, "invalid configuration for entrypoint '{key}': {reason}")
            }
            Self::BadRequest { reason } => write!(f, "bad request: {reason}"),
            Self::RetriesExhausted {
                title,
                attempts,
                last_error,
            } => {
                write!(f, "{title}: no acceptable result after {attempts} attempt(s)")?;
                if let Some(last_error) = last_error {
                    write!(f, ", last error: {last_error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LlmError {}

/// Errors from loading the entrypoints configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be read.
    Read { path: String, reason: String },
    /// The document is not a valid entrypoints configuration.
    Parse { path: String, reason: String },
    /// A default key names an entrypoint that is not configured.
    DefaultKeyMissing { field: &'static str, key: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, reason } => write!(f, "failed to read {path}: {reason}"),
            Self::Parse { path, reason } => write!(f, "failed to parse {path}: {reason}"),
            Self::DefaultKeyMissing { field, key } => {
                write!(f, "{field} '{key}' is not a configured entrypoint")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
