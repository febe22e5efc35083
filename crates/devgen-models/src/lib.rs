//! Generator implementations for devgen.
//!
//! This crate provides concrete implementations of the `Generator` trait.
//!
//! # Supported Providers
//!
//! - **Mock**: Local development and tests, no network access
//! - **OpenAI**: OpenAI Responses API (API key required)

pub mod factory;
pub mod openai;

use async_trait::async_trait;
use devgen_abstraction::{GenerationError, Generator};
use tracing::debug;

pub use factory::{GeneratorConfig, GeneratorFactory, GeneratorKind};
pub use openai::{OpenAIResponsesGenerator, OutputSelector};

/// A mock implementation of the `Generator` trait for testing and demonstration.
#[derive(Debug, Default)]
pub struct MockGenerator {
    id: String,
}

impl MockGenerator {
    /// Creates a new `MockGenerator` with the given ID.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(model_id = %self.id, prompt_len = prompt.len(), "MockGenerator generating text");

        Ok(format!("// generated by {}\n// {}", self.id, prompt.trim()))
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}
