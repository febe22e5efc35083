//! Configuration module for devgen.
//!
//! Values come from defaults, then an optional TOML file named by
//! `DEVGEN_CONFIG`, then environment variables. Empty variables count as unset.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use devgen_models::{GeneratorConfig, GeneratorKind, OutputSelector};
use serde::Deserialize;

use crate::error::{DevgenError, Result};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "DEVGEN_CONFIG";

/// Server configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// The address to bind the HTTP server to.
    #[serde(default = "default_address")]
    pub address: SocketAddr,
}

fn default_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: default_address() }
    }
}

/// Which entry store backs the service.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite file at `storage.path`.
    #[default]
    Sqlite,
    /// Process memory; entries are lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = DevgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(DevgenError::Config(format!("Unknown storage backend: {other}"))),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Database file for the SQLite backend.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data.db")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::default(), path: default_db_path() }
    }
}

/// Generation provider configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Provider name (openai, mock).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model ID sent to the provider.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Optional API base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Provider credential, normally from `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Optional organization, normally from `OPENAI_ORGANIZATION`.
    #[serde(default)]
    pub organization: Option<String>,
    /// Optional project, normally from `OPENAI_PROJECT`.
    #[serde(default)]
    pub project: Option<String>,
    /// Whole-request timeout in seconds; `0` disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Output item the text is read from.
    #[serde(default)]
    pub output_index: usize,
    /// Content block the text is read from.
    #[serde(default)]
    pub content_index: usize,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model_id() -> String {
    devgen_models::openai::DEFAULT_MODEL_ID.to_string()
}

const fn default_timeout_secs() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model_id: default_model_id(),
            base_url: None,
            api_key: None,
            organization: None,
            project: None,
            timeout_secs: default_timeout_secs(),
            output_index: 0,
            content_index: 0,
        }
    }
}

/// Inbound authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AuthSection {
    /// Secret every request must present in `X-API-Key`.
    #[serde(default)]
    pub service_api_key: Option<String>,
}

/// Root configuration for devgen.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Generation configuration.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthSection,
}

impl Config {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, a value does not
    /// parse, or the result fails [`Config::validate`].
    pub fn load() -> Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the environment.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_from<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns `DevgenError::Io` if the file cannot be read and
    /// `DevgenError::Config` if it is not valid TOML for this schema.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `DevgenError::Config` on invalid TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DevgenError::Config(format!("Invalid config file: {e}")))
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup("DEVGEN_ADDRESS") {
            self.server.address = address.parse()?;
        }
        if let Some(backend) = lookup("DEVGEN_STORAGE") {
            self.storage.backend = backend.parse()?;
        }
        if let Some(path) = lookup("DEVGEN_DB_PATH") {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(provider) = lookup("DEVGEN_PROVIDER") {
            self.generation.provider = provider;
        }
        if let Some(model_id) = lookup("DEVGEN_MODEL") {
            self.generation.model_id = model_id;
        }
        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            self.generation.api_key = Some(api_key);
        }
        if let Some(organization) = lookup("OPENAI_ORGANIZATION") {
            self.generation.organization = Some(organization);
        }
        if let Some(project) = lookup("OPENAI_PROJECT") {
            self.generation.project = Some(project);
        }
        if let Some(secret) = lookup("SERVICE_API_KEY") {
            self.auth.service_api_key = Some(secret);
        }
        Ok(())
    }

    /// Check the settings the server cannot start without.
    ///
    /// # Errors
    ///
    /// Returns `DevgenError::Config` if the service API key is missing or the
    /// provider is unknown.
    pub fn validate(&self) -> Result<()> {
        if self.service_api_key().is_none() {
            return Err(DevgenError::Config("SERVICE_API_KEY is not set".to_string()));
        }
        self.generator_kind()?;
        Ok(())
    }

    /// The configured inbound secret, if non-empty.
    pub fn service_api_key(&self) -> Option<&str> {
        self.auth.service_api_key.as_deref().filter(|k| !k.is_empty())
    }

    fn generator_kind(&self) -> Result<GeneratorKind> {
        GeneratorKind::from_str(&self.generation.provider).map_err(|()| {
            DevgenError::Config(format!("Unknown generation provider: {}", self.generation.provider))
        })
    }

    /// Builds the generator configuration for [`devgen_models::GeneratorFactory`].
    ///
    /// # Errors
    ///
    /// Returns `DevgenError::Config` if the provider is unknown.
    pub fn generator_config(&self) -> Result<GeneratorConfig> {
        let generation = &self.generation;
        let mut config = GeneratorConfig::new(self.generator_kind()?, generation.model_id.clone())
            .with_tenant(generation.organization.clone(), generation.project.clone())
            .with_selector(OutputSelector::new(generation.output_index, generation.content_index));
        if let Some(api_key) = &generation.api_key {
            config = config.with_api_key(api_key.clone());
        }
        if let Some(base_url) = &generation.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if generation.timeout_secs > 0 {
            config = config.with_timeout(Duration::from_secs(generation.timeout_secs));
        }
        Ok(config)
    }
}
