//! Centralized gateway configuration.
//!
//! Loaded via the `config` crate from environment variables. Nested fields
//! use `__` as the separator, so `HTTP__PORT=8080` sets [`HttpConfig::port`].

use maestro_tracks::NO_SUCH_TRACK;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Reported build version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Directory of uploaded file blobs.
    #[serde(default = "default_files_dir")]
    pub files_dir: PathBuf,

    /// Directory of live chat transcripts.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory of archived chat transcripts.
    #[serde(default = "default_archive_path")]
    pub archive_path: PathBuf,

    /// Entrypoints document. Without one, no LLM entrypoint is configured.
    #[serde(default)]
    pub entrypoints_path: Option<PathBuf>,

    /// Build every entrypoint at startup and log which are available.
    #[serde(default)]
    pub warmup_entrypoints: bool,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub messages: MessagesConfig,
}

/// Listener address.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Provider call budget.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Attempts per provider call, at least one.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// Pause between attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Fixed texts sent to users.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesConfig {
    /// Answer for chats bound to a track that does not exist.
    #[serde(default = "default_no_such_track")]
    pub no_such_track: String,
}

fn default_version() -> String {
    "dev".to_string()
}

fn default_files_dir() -> PathBuf {
    PathBuf::from("/mnt/data/maestro/files")
}

fn default_db_path() -> PathBuf {
    PathBuf::from("/mnt/data/maestro/dev/logs")
}

fn default_archive_path() -> PathBuf {
    PathBuf::from("/mnt/data/maestro/dev/archived_logs")
}

fn default_hostname() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7732
}

fn default_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_no_such_track() -> String {
    NO_SUCH_TRACK.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_port(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            no_such_track: default_no_such_track(),
        }
    }
}

impl HttpConfig {
    /// Returns the `host:port` address to bind.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

impl LlmConfig {
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::default())
    }

    fn from_source(env: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(env.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> ServerConfig {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_source(config::Environment::default().source(Some(source)))
            .expect("load config")
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]);
        assert_eq!(config.version, "dev");
        assert_eq!(config.db_path, PathBuf::from("/mnt/data/maestro/dev/logs"));
        assert_eq!(
            config.archive_path,
            PathBuf::from("/mnt/data/maestro/dev/archived_logs")
        );
        assert!(config.entrypoints_path.is_none());
        assert!(!config.warmup_entrypoints);
        assert_eq!(config.http.address(), "0.0.0.0:7732");
        assert_eq!(config.llm.attempts, 3);
        assert_eq!(config.llm.retry_delay(), Duration::from_millis(500));
        assert_eq!(config.messages.no_such_track, NO_SUCH_TRACK);
    }

    #[test]
    fn nested_fields_use_double_underscore() {
        let config = load(&[
            ("HTTP__PORT", "8080"),
            ("LLM__ATTEMPTS", "5"),
            ("WARMUP_ENTRYPOINTS", "true"),
            ("ENTRYPOINTS_PATH", "/etc/maestro/entrypoints.json"),
            ("MESSAGES__NO_SUCH_TRACK", "nope"),
        ]);
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.llm.attempts, 5);
        assert!(config.warmup_entrypoints);
        assert_eq!(
            config.entrypoints_path,
            Some(PathBuf::from("/etc/maestro/entrypoints.json"))
        );
        assert_eq!(config.messages.no_such_track, "nope");
    }
}
