//! Node configuration loading and management.

use badge_core::KeyType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Full configuration for the badge node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BadgeConfig {
    /// HTTP API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Key persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Issuer identity and key generation.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Verification pipeline settings.
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Rocksdb,
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Path to the data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Host the node's `did:web` identifier is derived from, e.g.
    /// `badges.example.com` or `localhost:9101`.
    #[serde(default = "default_did_host")]
    pub did_host: String,
    /// Type of the key generated on first start.
    #[serde(default = "default_key_type")]
    pub initial_key_type: KeyType,
    #[serde(default = "default_key_id")]
    pub initial_key_id: String,
    /// Modulus size for generated RSA keys.
    #[serde(default = "default_rsa_bits")]
    pub rsa_bits: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Bound on each issuer-resolver and status-checker call.
    #[serde(default = "default_collaborator_timeout_ms")]
    pub collaborator_timeout_ms: u64,
    /// Issuer IRIs trusted in addition to this node's own DID.
    #[serde(default)]
    pub trusted_issuers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    9101
}
fn default_backend() -> StorageBackend {
    StorageBackend::Rocksdb
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_did_host() -> String {
    "localhost:9101".into()
}
fn default_key_type() -> KeyType {
    KeyType::Ed25519
}
fn default_key_id() -> String {
    "default".into()
}
fn default_rsa_bits() -> usize {
    2048
}
fn default_collaborator_timeout_ms() -> u64 {
    5000
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            did_host: default_did_host(),
            initial_key_type: default_key_type(),
            initial_key_id: default_key_id(),
            rsa_bits: default_rsa_bits(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            collaborator_timeout_ms: default_collaborator_timeout_ms(),
            trusted_issuers: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl VerificationConfig {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

impl BadgeConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: BadgeConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The `host:port` the API binds to.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }
}
