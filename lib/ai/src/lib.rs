//! LLM access for maestro.
//!
//! - **Registry**: named provider/model entrypoints with declared
//!   capabilities, built lazily and cached
//! - **Accessor**: routes requests by attachment type, falls back to the
//!   default key and retries with a bounded number of attempts
//!
//! Providers are GigaChat and OpenRouter over HTTP.

pub mod accessor;
pub mod backend;
pub mod config;
pub mod error;
pub mod providers;
pub mod registry;
pub mod retry;

pub use accessor::{LlmAccessor, LlmApi};
pub use backend::{
    Capability, EntryPoint, LlmCallProps, LlmMessage, MessageRole, Payload, ProviderKind, Request,
    ResponseExt,
};
pub use config::{EntrypointConfig, EntrypointInfo, EntrypointsConfig, EntrypointsInfo};
pub use error::{ConfigError, LlmError};
pub use registry::{EntryPointBuilder, EntrypointRegistry, HttpEntryPointBuilder, WarmupReport};
pub use retry::RetryPolicy;
