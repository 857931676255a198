mod config;
mod context;
mod stages;
mod state;

pub use config::{AnswerConfig, AnswerTuning};

use std::{sync::Arc, time::Duration};

use common::{corpus::Corpus, error::AppError, llm::LlmClient};
use serde::Serialize;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::QueryAnswer;

use self::{
    context::PipelineContext,
    stages::{aggregate_results, chunk_corpus, query_chunks, synthesize_answer},
    state::chunking,
};

/// Per-stage wall-clock timings of one run, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageTimings {
    pub chunk_ms: u64,
    pub query_ms: u64,
    pub aggregate_ms: u64,
    pub synthesize_ms: u64,
    pub total_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerDiagnostics {
    pub run_id: Uuid,
    pub chunk_count: usize,
    pub relevant_count: usize,
    pub merged_chars: usize,
    pub timings: StageTimings,
}

#[derive(Debug, Clone)]
pub struct AnswerOutput {
    pub answer: QueryAnswer,
    pub diagnostics: AnswerDiagnostics,
}

/// Answers questions over a fixed corpus.
///
/// The corpus is loaded once by the caller and shared by every run.
#[allow(clippy::module_name_repetitions)]
pub struct AnswerPipeline {
    client: Arc<dyn LlmClient>,
    corpus: Corpus,
    config: AnswerConfig,
}

impl AnswerPipeline {
    pub fn new(client: Arc<dyn LlmClient>, corpus: Corpus, config: AnswerConfig) -> Self {
        Self {
            client,
            corpus,
            config,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn config(&self) -> &AnswerConfig {
        &self.config
    }

    pub async fn ask(&self, query: &str) -> Result<QueryAnswer, AppError> {
        self.ask_with_diagnostics(query)
            .await
            .map(|output| output.answer)
    }

    #[tracing::instrument(skip_all, fields(query_chars = query.chars().count()))]
    pub async fn ask_with_diagnostics(&self, query: &str) -> Result<AnswerOutput, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::Validation("query must not be empty".into()));
        }

        let mut ctx = PipelineContext::new(query, &self.corpus, &self.client, &self.config);
        let machine = chunking();

        let pipeline_started = Instant::now();

        let stage_start = Instant::now();
        let machine = chunk_corpus(machine, &mut ctx).map_err(|err| ctx.abort(err))?;
        let chunk_duration = stage_start.elapsed();

        let stage_start = Instant::now();
        let machine = query_chunks(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let query_duration = stage_start.elapsed();

        let stage_start = Instant::now();
        let machine = aggregate_results(machine, &mut ctx).map_err(|err| ctx.abort(err))?;
        let aggregate_duration = stage_start.elapsed();

        let stage_start = Instant::now();
        let _machine = synthesize_answer(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let synthesize_duration = stage_start.elapsed();

        let timings = StageTimings {
            chunk_ms: duration_millis(chunk_duration),
            query_ms: duration_millis(query_duration),
            aggregate_ms: duration_millis(aggregate_duration),
            synthesize_ms: duration_millis(synthesize_duration),
            total_ms: duration_millis(pipeline_started.elapsed()),
        };
        let diagnostics = AnswerDiagnostics {
            run_id: ctx.run_id,
            chunk_count: ctx.chunks.len(),
            relevant_count: ctx.relevant_count(),
            merged_chars: ctx.merged_text.chars().count(),
            timings,
        };

        info!(
            run_id = %diagnostics.run_id,
            chunk_count = diagnostics.chunk_count,
            relevant_count = diagnostics.relevant_count,
            total_ms = diagnostics.timings.total_ms,
            chunk_ms = diagnostics.timings.chunk_ms,
            query_ms = diagnostics.timings.query_ms,
            aggregate_ms = diagnostics.timings.aggregate_ms,
            synthesize_ms = diagnostics.timings.synthesize_ms,
            "answer pipeline finished"
        );

        let answer = ctx.take_answer().map_err(|err| ctx.abort(err))?;
        Ok(AnswerOutput {
            answer,
            diagnostics,
        })
    }
}

/// One-shot convenience over [`AnswerPipeline`].
pub async fn answer(
    client: Arc<dyn LlmClient>,
    query: &str,
    corpus: Corpus,
    config: AnswerConfig,
) -> Result<QueryAnswer, AppError> {
    AnswerPipeline::new(client, corpus, config).ask(query).await
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests;
