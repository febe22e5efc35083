//! OpenAI Responses API generator.
//!
//! Sends one `POST {base_url}/responses` per call and never retries. A 2xx body
//! that does not have the expected `output[].content[].text` shape is returned
//! verbatim instead of failing the call.

use async_trait::async_trait;
use devgen_abstraction::{GenerationError, Generator};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Default base URL for the OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model sent with every request.
pub const DEFAULT_MODEL_ID: &str = "o4-mini";

/// Position in the response payload the output text is read from.
///
/// Defaults to the first content block of the first output item. Reasoning
/// models emit a reasoning item without content first; point `output_index`
/// at 1 for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputSelector {
    /// Index into `output`.
    pub output_index: usize,
    /// Index into `output[output_index].content`.
    pub content_index: usize,
}

impl OutputSelector {
    /// Creates a selector for the given output item and content block.
    #[must_use]
    pub const fn new(output_index: usize, content_index: usize) -> Self {
        Self { output_index, content_index }
    }
}

/// OpenAI Responses API generator.
#[derive(Debug, Clone)]
pub struct OpenAIResponsesGenerator {
    /// The model ID (e.g., "o4-mini").
    model_id: String,
    /// The API key for authentication.
    api_key: String,
    /// Optional `OpenAI-Organization` header value.
    organization: Option<String>,
    /// Optional `OpenAI-Project` header value.
    project: Option<String>,
    /// The base URL for the OpenAI API.
    base_url: String,
    /// Where the output text is read from.
    selector: OutputSelector,
    /// HTTP client for making requests.
    client: Client,
}

impl OpenAIResponsesGenerator {
    /// Creates a new generator with an explicit API key and default settings.
    ///
    /// # Arguments
    /// * `model_id` - The OpenAI model ID to use
    /// * `api_key` - The API key for authentication
    #[must_use]
    pub fn with_api_key(model_id: String, api_key: String) -> Self {
        Self {
            model_id,
            api_key,
            organization: None,
            project: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            selector: OutputSelector::default(),
            client: Client::new(),
        }
    }

    /// Sets the organization header. Empty values are ignored.
    #[must_use]
    pub fn with_organization(mut self, organization: Option<String>) -> Self {
        self.organization = organization.filter(|o| !o.is_empty());
        self
    }

    /// Sets the project header. Empty values are ignored.
    #[must_use]
    pub fn with_project(mut self, project: Option<String>) -> Self {
        self.project = project.filter(|p| !p.is_empty());
        self
    }

    /// Overrides the API base URL (used for tests and compatible gateways).
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Overrides the extraction position.
    #[must_use]
    pub fn with_selector(mut self, selector: OutputSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Rebuilds the HTTP client with a whole-request timeout.
    ///
    /// # Errors
    /// Returns `GenerationError::Configuration` if the client cannot be built.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, GenerationError> {
        self.client = Client::builder().timeout(timeout).build().map_err(|e| {
            GenerationError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(self)
    }

    /// Returns the configured extraction position.
    pub fn selector(&self) -> OutputSelector {
        self.selector
    }

    /// Reads the text at `selector` from a Responses API body.
    ///
    /// Returns `None` when the body is not the expected shape or the position
    /// is absent.
    pub fn extract_text(body: &str, selector: OutputSelector) -> Option<String> {
        let payload: ResponsesPayload = serde_json::from_str(body).ok()?;
        payload
            .output?
            .into_iter()
            .nth(selector.output_index)?
            .content?
            .into_iter()
            .nth(selector.content_index)?
            .text
            .map(|text| text.trim().to_string())
    }
}

#[async_trait]
impl Generator for OpenAIResponsesGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/responses", self.base_url);

        debug!(
            model_id = %self.model_id,
            prompt_len = prompt.len(),
            has_organization = self.organization.is_some(),
            has_project = self.project.is_some(),
            "OpenAIResponsesGenerator sending request"
        );

        let request_body = ResponsesRequest { model: &self.model_id, input: prompt };

        let mut request = self.client.post(&url).bearer_auth(&self.api_key).json(&request_body);
        if let Some(organization) = &self.organization {
            request = request.header("OpenAI-Organization", organization);
        }
        if let Some(project) = &self.project {
            request = request.header("OpenAI-Project", project);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Failed to send request to OpenAI API");
            GenerationError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read OpenAI API response body");
            GenerationError::Transport(e.to_string())
        })?;

        if !status.is_success() {
            error!(status = %status, body = %body, "OpenAI API returned error status");
            return Err(GenerationError::UpstreamStatus { status: status.as_u16(), body });
        }

        match Self::extract_text(&body, self.selector) {
            Some(text) => Ok(text),
            None => {
                warn!(
                    selector = ?self.selector,
                    body_len = body.len(),
                    "Unexpected OpenAI response shape, returning raw body"
                );
                Ok(body)
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// OpenAI Responses API request/response structures

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesPayload {
    #[serde(default)]
    output: Option<Vec<OutputItem>>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
