//! Generator factory for creating generator instances from configuration.

use crate::openai::{DEFAULT_MODEL_ID, OutputSelector};
use crate::{MockGenerator, OpenAIResponsesGenerator};
use devgen_abstraction::{GenerationError, Generator};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Generator provider enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Mock generator for local runs and tests.
    Mock,
    /// OpenAI Responses API.
    OpenAI,
}

impl FromStr for GeneratorKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "openai" => Ok(Self::OpenAI),
            _ => Err(()),
        }
    }
}

/// Generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// The provider to create.
    pub kind: GeneratorKind,
    /// The model ID sent with every request.
    pub model_id: String,
    /// Provider credential. Required for OpenAI.
    pub api_key: Option<String>,
    /// Optional organization identifier.
    pub organization: Option<String>,
    /// Optional project identifier.
    pub project: Option<String>,
    /// Optional API base URL override.
    pub base_url: Option<String>,
    /// Optional whole-request timeout.
    pub timeout: Option<Duration>,
    /// Extraction position in the response payload.
    pub selector: OutputSelector,
}

impl GeneratorConfig {
    /// Creates a new `GeneratorConfig` with the given kind and model ID.
    #[must_use]
    pub fn new(kind: GeneratorKind, model_id: String) -> Self {
        Self {
            kind,
            model_id,
            api_key: None,
            organization: None,
            project: None,
            base_url: None,
            timeout: None,
            selector: OutputSelector::default(),
        }
    }

    /// Sets the API key for this configuration.
    #[must_use]
    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Sets the organization and project identifiers.
    #[must_use]
    pub fn with_tenant(mut self, organization: Option<String>, project: Option<String>) -> Self {
        self.organization = organization;
        self.project = project;
        self
    }

    /// Sets the base URL for this configuration.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the extraction position.
    #[must_use]
    pub fn with_selector(mut self, selector: OutputSelector) -> Self {
        self.selector = selector;
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(GeneratorKind::OpenAI, DEFAULT_MODEL_ID.to_string())
    }
}

/// Factory for creating generator instances.
pub struct GeneratorFactory;

impl GeneratorFactory {
    /// Creates a generator from the given configuration.
    ///
    /// # Errors
    /// Returns `GenerationError::Configuration` if the provider cannot be built
    /// (e.g., missing API key).
    pub fn create(config: GeneratorConfig) -> Result<Arc<dyn Generator>, GenerationError> {
        debug!(
            kind = ?config.kind,
            model_id = %config.model_id,
            "Creating generator instance"
        );

        match config.kind {
            GeneratorKind::Mock => Ok(Arc::new(MockGenerator::new(config.model_id))),
            GeneratorKind::OpenAI => {
                let api_key = config.api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                    error!("OpenAI generator requested without an API key");
                    GenerationError::Configuration(
                        "OPENAI_API_KEY environment variable not set".to_string(),
                    )
                })?;

                let mut generator =
                    OpenAIResponsesGenerator::with_api_key(config.model_id, api_key)
                        .with_organization(config.organization)
                        .with_project(config.project)
                        .with_selector(config.selector);
                if let Some(base_url) = config.base_url {
                    generator = generator.with_base_url(base_url);
                }
                if let Some(timeout) = config.timeout {
                    generator = generator.with_timeout(timeout)?;
                }
                Ok(Arc::new(generator))
            }
        }
    }

    /// Creates a generator from a provider string and model ID.
    ///
    /// # Errors
    /// Returns a `GenerationError` if the provider is unrecognized or creation fails.
    pub fn create_from_str(
        kind_str: &str,
        model_id: String,
    ) -> Result<Arc<dyn Generator>, GenerationError> {
        let kind = GeneratorKind::from_str(kind_str).map_err(|()| {
            error!(kind = %kind_str, "Unrecognized generator provider");
            GenerationError::Configuration(format!("Unrecognized generator provider: {}", kind_str))
        })?;

        Self::create(GeneratorConfig::new(kind, model_id))
    }
}
