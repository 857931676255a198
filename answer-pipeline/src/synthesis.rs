use std::time::Duration;

use common::{
    error::AppError,
    llm::{LlmClient, LlmDocument},
};
use tracing::{debug, info};

use crate::{
    retry::{timed_query, RetryPolicy},
    QueryAnswer,
};

pub const MERGED_DOCUMENT_NAME: &str = "merged-relevant-chunks";

/// Produce the final answer from the merged relevant text.
///
/// Empty `merged_text` short-circuits to the "no relevant information" answer
/// without calling the model. Errors propagate to the caller; they are only
/// retried when a `retry` policy is supplied.
pub async fn synthesize(
    client: &dyn LlmClient,
    query: &str,
    merged_text: &str,
    retry: Option<&RetryPolicy>,
    timeout: Option<Duration>,
) -> Result<QueryAnswer, AppError> {
    if merged_text.trim().is_empty() {
        info!("no relevant chunks; skipping synthesis");
        return Ok(QueryAnswer::no_relevant_information());
    }

    let document = LlmDocument::new(MERGED_DOCUMENT_NAME, merged_text);
    debug!(
        merged_chars = merged_text.chars().count(),
        retried = retry.is_some(),
        "issuing synthesis query"
    );

    let response = match retry {
        Some(policy) => {
            policy
                .run(MERGED_DOCUMENT_NAME, || {
                    timed_query(client, query, &document, timeout)
                })
                .await?
        }
        None => timed_query(client, query, &document, timeout).await?,
    };

    Ok(QueryAnswer::from(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::llm::testing::{relevant, ScriptedLlmClient};

    #[tokio::test]
    async fn empty_merge_short_circuits_without_calling_the_model() {
        let client = ScriptedLlmClient::new(|_| Ok(relevant("should not be used", "")));

        let answer = synthesize(&client, "Who is the landlord?", "", None, None)
            .await
            .expect("short circuit succeeds");

        assert_eq!(answer, QueryAnswer::no_relevant_information());
        assert_eq!(answer.content, "No relevant information found.");
        assert!(answer.reasoning.is_empty());
        assert_eq!(client.call_count().await, 0);
    }

    #[tokio::test]
    async fn sends_merged_text_as_one_document() {
        let client = ScriptedLlmClient::new(|_| Ok(relevant("Acme Corp.", "Recital A names Acme.")));

        let answer = synthesize(
            &client,
            "Who is the landlord?",
            "Acme Corp is the landlord.\n\nRent is due monthly.",
            None,
            None,
        )
        .await
        .expect("synthesis succeeds");

        assert_eq!(answer.content, "Acme Corp.");
        assert_eq!(answer.reasoning, "Recital A names Acme.");

        let calls = client.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "Who is the landlord?");
        assert_eq!(calls[0].document.name, MERGED_DOCUMENT_NAME);
        assert_eq!(
            calls[0].document.content,
            "Acme Corp is the landlord.\n\nRent is due monthly."
        );
    }

    #[tokio::test]
    async fn failures_propagate_without_retry_by_default() {
        let client = ScriptedLlmClient::new(|_| Err(AppError::RateLimited("429".into())));

        let err = synthesize(&client, "Q", "Some text.", None, None)
            .await
            .expect_err("synthesis fails");

        assert!(err.is_rate_limit());
        assert_eq!(client.call_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn optional_retry_recovers_from_rate_limits() {
        let client = ScriptedLlmClient::new(|call| {
            if call.attempt < 3 {
                Err(AppError::RateLimited("429".into()))
            } else {
                Ok(relevant("Recovered.", "Third time lucky."))
            }
        });

        let answer = synthesize(
            &client,
            "Q",
            "Some text.",
            Some(&RetryPolicy::default()),
            None,
        )
        .await
        .expect("retried synthesis succeeds");

        assert_eq!(answer.content, "Recovered.");
        assert_eq!(client.call_count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_surfaces_as_error() {
        let client = ScriptedLlmClient::new(|_| Ok(relevant("late", "late")))
            .with_latency(|_| Duration::from_secs(120));

        let err = synthesize(&client, "Q", "Text.", None, Some(Duration::from_secs(30)))
            .await
            .expect_err("synthesis times out");

        assert!(matches!(err, AppError::Timeout(_)));
    }
}
