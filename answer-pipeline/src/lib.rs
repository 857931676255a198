#![allow(clippy::missing_docs_in_private_items)]

pub mod aggregate;
pub mod chunker;
pub mod pipeline;
pub mod relevance;
pub mod retry;
pub mod synthesis;

use std::fmt;

use common::llm::LlmResponse;
use serde::{Deserialize, Serialize};

pub use aggregate::aggregate;
pub use chunker::split;
pub use pipeline::{
    answer, AnswerConfig, AnswerDiagnostics, AnswerOutput, AnswerPipeline, AnswerTuning,
    StageTimings,
};
pub use relevance::{query_chunk, query_chunks};
pub use retry::RetryPolicy;
pub use synthesis::synthesize;

pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found.";

/// Sentence-aligned slice of the corpus; `id` is the position in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: usize,
    pub text: String,
}

/// Outcome of querying one chunk. Failed queries are recorded as irrelevant with
/// empty content, never dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    pub chunk_id: usize,
    pub original_text: String,
    pub content: String,
    pub reasoning: String,
    pub is_irrelevant: bool,
}

impl ChunkResult {
    pub fn from_response(chunk: &Chunk, response: LlmResponse) -> Self {
        Self {
            chunk_id: chunk.id,
            original_text: chunk.text.clone(),
            content: response.content,
            reasoning: response.reasoning,
            is_irrelevant: response.is_irrelevant,
        }
    }

    pub fn irrelevant(chunk: &Chunk) -> Self {
        Self {
            chunk_id: chunk.id,
            original_text: chunk.text.clone(),
            content: String::new(),
            reasoning: String::new(),
            is_irrelevant: true,
        }
    }
}

/// Answer delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub content: String,
    pub reasoning: String,
}

impl QueryAnswer {
    pub fn no_relevant_information() -> Self {
        Self {
            content: NO_RELEVANT_INFORMATION.to_string(),
            reasoning: String::new(),
        }
    }
}

impl From<LlmResponse> for QueryAnswer {
    fn from(response: LlmResponse) -> Self {
        Self {
            content: response.content,
            reasoning: response.reasoning,
        }
    }
}

impl fmt::Display for QueryAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Final Answer: {}\n\nReasoning: {}",
            self.content, self.reasoning
        )
    }
}
