use std::sync::Arc;

use common::error::AppError;
use state_machines::core::GuardError;
use tracing::{debug, instrument, warn};

use crate::{aggregate::aggregate, chunker::split, relevance, synthesis::synthesize};

use super::{
    context::PipelineContext,
    state::{Aggregating, AnswerMachine, Chunking, Done, Querying, Synthesizing},
};

#[instrument(level = "trace", skip_all, fields(run_id = %ctx.run_id))]
pub fn chunk_corpus(
    machine: AnswerMachine<(), Chunking>,
    ctx: &mut PipelineContext<'_>,
) -> Result<AnswerMachine<(), Querying>, AppError> {
    let parts = ctx.config.tuning.chunk_parts;
    ctx.chunks = split(ctx.corpus.as_str(), parts);

    debug!(
        run_id = %ctx.run_id,
        corpus_bytes = ctx.corpus.len(),
        requested_parts = parts,
        chunk_count = ctx.chunks.len(),
        "corpus chunked"
    );

    machine
        .chunked()
        .map_err(|(_, guard)| map_guard_error("chunked", &guard))
}

#[instrument(level = "trace", skip_all, fields(run_id = %ctx.run_id, chunks = ctx.chunks.len()))]
pub async fn query_chunks(
    machine: AnswerMachine<(), Querying>,
    ctx: &mut PipelineContext<'_>,
) -> Result<AnswerMachine<(), Aggregating>, AppError> {
    let policy = ctx.config.tuning.retry_policy();
    ctx.results = relevance::query_chunks(
        Arc::clone(ctx.client),
        ctx.query,
        &ctx.chunks,
        &policy,
        ctx.config.tuning.request_timeout,
    )
    .await;

    debug!(
        run_id = %ctx.run_id,
        chunk_count = ctx.results.len(),
        relevant_count = ctx.relevant_count(),
        "chunks classified"
    );

    machine
        .queried()
        .map_err(|(_, guard)| map_guard_error("queried", &guard))
}

#[instrument(level = "trace", skip_all, fields(run_id = %ctx.run_id))]
pub fn aggregate_results(
    machine: AnswerMachine<(), Aggregating>,
    ctx: &mut PipelineContext<'_>,
) -> Result<AnswerMachine<(), Synthesizing>, AppError> {
    ctx.merged_text = aggregate(&ctx.results);

    debug!(
        run_id = %ctx.run_id,
        merged_chars = ctx.merged_text.chars().count(),
        "relevant chunks merged"
    );

    machine
        .aggregated()
        .map_err(|(_, guard)| map_guard_error("aggregated", &guard))
}

#[instrument(level = "trace", skip_all, fields(run_id = %ctx.run_id))]
pub async fn synthesize_answer(
    machine: AnswerMachine<(), Synthesizing>,
    ctx: &mut PipelineContext<'_>,
) -> Result<AnswerMachine<(), Done>, AppError> {
    let retry = ctx.config.synthesis_retry();
    let outcome = synthesize(
        ctx.client.as_ref(),
        ctx.query,
        &ctx.merged_text,
        retry.as_ref(),
        ctx.config.tuning.request_timeout,
    )
    .await;

    match outcome {
        Ok(answer) => {
            ctx.answer = Some(answer);
            machine
                .synthesized()
                .map_err(|(_, guard)| map_guard_error("synthesized", &guard))
        }
        Err(err) => {
            if let Err((_, guard)) = machine.abort() {
                warn!(run_id = %ctx.run_id, ?guard, "could not mark answer pipeline as failed");
            }
            Err(err)
        }
    }
}

fn map_guard_error(event: &str, guard: &GuardError) -> AppError {
    AppError::InternalError(format!(
        "invalid answer pipeline transition during {event}: {guard:?}"
    ))
}
