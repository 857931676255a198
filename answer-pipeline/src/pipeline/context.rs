use std::sync::Arc;

use common::{corpus::Corpus, error::AppError, llm::LlmClient};
use tracing::error;
use uuid::Uuid;

use crate::{Chunk, ChunkResult, QueryAnswer};

use super::config::AnswerConfig;

pub struct PipelineContext<'a> {
    pub run_id: Uuid,
    pub query: &'a str,
    pub corpus: &'a Corpus,
    pub client: &'a Arc<dyn LlmClient>,
    pub config: &'a AnswerConfig,
    pub chunks: Vec<Chunk>,
    pub results: Vec<ChunkResult>,
    pub merged_text: String,
    pub answer: Option<QueryAnswer>,
}

impl<'a> PipelineContext<'a> {
    pub fn new(
        query: &'a str,
        corpus: &'a Corpus,
        client: &'a Arc<dyn LlmClient>,
        config: &'a AnswerConfig,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            query,
            corpus,
            client,
            config,
            chunks: Vec::new(),
            results: Vec::new(),
            merged_text: String::new(),
            answer: None,
        }
    }

    pub fn relevant_count(&self) -> usize {
        self.results
            .iter()
            .filter(|result| !result.is_irrelevant)
            .count()
    }

    pub fn take_answer(&mut self) -> Result<QueryAnswer, AppError> {
        self.answer.take().ok_or_else(|| {
            AppError::InternalError("answer expected to be available after synthesis".into())
        })
    }

    pub fn abort(&mut self, err: AppError) -> AppError {
        error!(
            run_id = %self.run_id,
            error = %err,
            "answer pipeline aborted"
        );
        err
    }
}
