mod openai;
pub mod prompts;
pub mod response;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use openai::{classify_openai_error, OpenAiLlmClient};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A named piece of text handed to the model alongside the question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmDocument {
    pub name: String,
    pub content: String,
}

impl LlmDocument {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Structured answer returned by every [`LlmClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub reasoning: String,
    pub is_irrelevant: bool,
}

/// Question-answering backend.
///
/// One handle is shared by every concurrent chunk query of a pipeline run,
/// so implementations must be safe for concurrent use.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn query(&self, prompt: &str, document: &LlmDocument) -> Result<LlmResponse, AppError>;
}
