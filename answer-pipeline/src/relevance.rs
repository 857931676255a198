use std::{sync::Arc, time::Duration};

use common::llm::{LlmClient, LlmDocument};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::{
    retry::{timed_query, RetryPolicy},
    Chunk, ChunkResult,
};

fn chunk_document(chunk: &Chunk) -> LlmDocument {
    LlmDocument::new(format!("chunk-{}", chunk.id), chunk.text.clone())
}

/// Ask the model whether `chunk` is relevant to `query`.
///
/// Never fails: rate-limit errors are retried along `policy`, and any error
/// left after that turns into an irrelevant, empty result for this chunk.
pub async fn query_chunk(
    client: &dyn LlmClient,
    query: &str,
    chunk: &Chunk,
    policy: &RetryPolicy,
    timeout: Option<Duration>,
) -> ChunkResult {
    let document = chunk_document(chunk);

    match policy
        .run(&document.name, || {
            timed_query(client, query, &document, timeout)
        })
        .await
    {
        Ok(response) => {
            debug!(
                chunk_id = chunk.id,
                is_irrelevant = response.is_irrelevant,
                "chunk classified"
            );
            ChunkResult::from_response(chunk, response)
        }
        Err(err) => {
            warn!(
                chunk_id = chunk.id,
                rate_limited = err.is_rate_limit(),
                error = %err,
                "chunk query failed; treating chunk as irrelevant"
            );
            ChunkResult::irrelevant(chunk)
        }
    }
}

/// Query every chunk concurrently and return one result per chunk, in chunk order.
///
/// All tasks are spawned before any is awaited. A task that panics is
/// recorded as irrelevant for its chunk.
pub async fn query_chunks(
    client: Arc<dyn LlmClient>,
    query: &str,
    chunks: &[Chunk],
    policy: &RetryPolicy,
    timeout: Option<Duration>,
) -> Vec<ChunkResult> {
    let query: Arc<str> = Arc::from(query);
    let mut join_set = JoinSet::new();

    for (index, chunk) in chunks.iter().enumerate() {
        let client = Arc::clone(&client);
        let query = Arc::clone(&query);
        let chunk = chunk.clone();
        let policy = policy.clone();

        join_set.spawn(async move {
            let result = query_chunk(client.as_ref(), &query, &chunk, &policy, timeout).await;
            (index, result)
        });
    }

    let mut slots: Vec<Option<ChunkResult>> = vec![None; chunks.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, result)) => {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(result);
                }
            }
            Err(err) => error!(error = %err, "chunk query task did not complete"),
        }
    }

    chunks
        .iter()
        .zip(slots)
        .map(|(chunk, slot)| slot.unwrap_or_else(|| ChunkResult::irrelevant(chunk)))
        .collect()
}
