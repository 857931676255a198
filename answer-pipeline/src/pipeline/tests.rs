use std::sync::Arc;

use common::{
    corpus::Corpus,
    error::AppError,
    llm::{
        testing::{irrelevant, relevant, ScriptedLlmClient},
        LlmClient,
    },
};

use super::{answer, AnswerConfig, AnswerPipeline, AnswerTuning};
use crate::{synthesis::MERGED_DOCUMENT_NAME, QueryAnswer};

const CORPUS: &str = "Sentence one. Sentence two. Sentence three. Sentence four.";

fn config_with_parts(chunk_parts: usize) -> AnswerConfig {
    AnswerConfig {
        tuning: AnswerTuning {
            chunk_parts,
            ..AnswerTuning::default()
        },
        retry_synthesis: false,
    }
}

// Marks `chunk-0` relevant, every other chunk irrelevant, and answers the merge.
fn first_chunk_relevant() -> Arc<ScriptedLlmClient> {
    Arc::new(ScriptedLlmClient::new(|call| {
        match call.document.name.as_str() {
            "chunk-0" => Ok(relevant("It mentions sentences.", "First chunk.")),
            MERGED_DOCUMENT_NAME => Ok(relevant("Sentences one and two.", "Merged text.")),
            _ => Ok(irrelevant()),
        }
    }))
}

fn pipeline(client: &Arc<ScriptedLlmClient>, corpus: &str, config: AnswerConfig) -> AnswerPipeline {
    let client: Arc<dyn LlmClient> = client.clone();
    AnswerPipeline::new(client, Corpus::from(corpus), config)
}

#[tokio::test]
async fn answers_from_relevant_chunks_only() {
    let client = first_chunk_relevant();
    let pipeline = pipeline(&client, CORPUS, config_with_parts(2));

    let output = pipeline
        .ask_with_diagnostics("What do the sentences say?")
        .await
        .expect("pipeline succeeds");

    assert_eq!(
        output.answer,
        QueryAnswer {
            content: "Sentences one and two.".into(),
            reasoning: "Merged text.".into(),
        }
    );
    assert_eq!(output.diagnostics.chunk_count, 2);
    assert_eq!(output.diagnostics.relevant_count, 1);

    let chunk_calls = client.calls_for("chunk-1").await;
    assert_eq!(chunk_calls.len(), 1);
    assert_eq!(chunk_calls[0].document.content, "Sentence three. Sentence four.");

    let synthesis_calls = client.calls_for(MERGED_DOCUMENT_NAME).await;
    assert_eq!(synthesis_calls.len(), 1);
    assert_eq!(synthesis_calls[0].prompt, "What do the sentences say?");
    assert_eq!(synthesis_calls[0].document.content, "Sentence one. Sentence two.");
    assert_eq!(client.call_count().await, 3);
}

#[tokio::test]
async fn every_chunk_receives_the_raw_query() {
    let client = first_chunk_relevant();
    let pipeline = pipeline(&client, CORPUS, config_with_parts(4));

    pipeline.ask("Which sentence?").await.expect("pipeline succeeds");

    let calls = client.calls().await;
    assert_eq!(calls.len(), 5);
    assert!(calls.iter().all(|call| call.prompt == "Which sentence?"));
}

#[tokio::test]
async fn nothing_relevant_skips_synthesis() {
    let client = Arc::new(ScriptedLlmClient::new(|_| Ok(irrelevant())));
    let pipeline = pipeline(&client, CORPUS, config_with_parts(2));

    let output = pipeline
        .ask_with_diagnostics("Who signed the lease?")
        .await
        .expect("pipeline succeeds");

    assert_eq!(output.answer, QueryAnswer::no_relevant_information());
    assert_eq!(output.diagnostics.relevant_count, 0);
    assert_eq!(output.diagnostics.merged_chars, 0);
    assert_eq!(client.call_count().await, 2);
    assert!(client.calls_for(MERGED_DOCUMENT_NAME).await.is_empty());
}

#[tokio::test]
async fn empty_corpus_makes_no_calls() {
    let client = first_chunk_relevant();
    let pipeline = pipeline(&client, "   \n", config_with_parts(8));

    let output = pipeline
        .ask_with_diagnostics("Anything?")
        .await
        .expect("pipeline succeeds");

    assert_eq!(output.answer.content, "No relevant information found.");
    assert_eq!(output.diagnostics.chunk_count, 0);
    assert_eq!(client.call_count().await, 0);
}

#[tokio::test]
async fn failed_chunks_are_treated_as_irrelevant() {
    let client = Arc::new(ScriptedLlmClient::new(|call| {
        match call.document.name.as_str() {
            "chunk-0" => Err(AppError::LLMParsing("garbled".into())),
            "chunk-1" => Ok(relevant("Three and four.", "Second chunk.")),
            _ => Ok(relevant("Final.", "From the second chunk.")),
        }
    }));
    let pipeline = pipeline(&client, CORPUS, config_with_parts(2));

    let output = pipeline
        .ask_with_diagnostics("Q")
        .await
        .expect("pipeline succeeds");

    assert_eq!(output.answer.content, "Final.");
    assert_eq!(output.diagnostics.relevant_count, 1);
    let synthesis_calls = client.calls_for(MERGED_DOCUMENT_NAME).await;
    assert_eq!(
        synthesis_calls[0].document.content,
        "Sentence three. Sentence four."
    );
}

#[tokio::test]
async fn synthesis_failure_propagates() {
    let client = Arc::new(ScriptedLlmClient::new(|call| {
        if call.document.name == MERGED_DOCUMENT_NAME {
            Err(AppError::RateLimited("429".into()))
        } else {
            Ok(relevant("yes", "yes"))
        }
    }));
    let pipeline = pipeline(&client, CORPUS, config_with_parts(2));

    let err = pipeline.ask("Q").await.expect_err("synthesis fails");

    assert!(err.is_rate_limit());
    assert_eq!(client.calls_for(MERGED_DOCUMENT_NAME).await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn synthesis_retry_is_opt_in() {
    let client = Arc::new(ScriptedLlmClient::new(|call| {
        if call.document.name == MERGED_DOCUMENT_NAME && call.attempt == 1 {
            Err(AppError::RateLimited("429".into()))
        } else {
            Ok(relevant("answer", "reason"))
        }
    }));
    let config = AnswerConfig {
        retry_synthesis: true,
        ..config_with_parts(2)
    };
    let pipeline = pipeline(&client, CORPUS, config);

    let output = pipeline
        .ask_with_diagnostics("Q")
        .await
        .expect("retried synthesis succeeds");

    assert_eq!(output.answer.content, "answer");
    assert_eq!(client.calls_for(MERGED_DOCUMENT_NAME).await.len(), 2);
    assert!(output.diagnostics.timings.synthesize_ms >= 2_000);
}

#[tokio::test(start_paused = true)]
async fn rate_limited_chunks_recover_within_the_run() {
    let client = Arc::new(ScriptedLlmClient::new(|call| {
        match (call.document.name.as_str(), call.attempt) {
            ("chunk-0", attempt) if attempt < 3 => Err(AppError::RateLimited("429".into())),
            ("chunk-0", _) => Ok(relevant("found", "eventually")),
            (MERGED_DOCUMENT_NAME, _) => Ok(relevant("final", "merged")),
            _ => Ok(irrelevant()),
        }
    }));
    let pipeline = pipeline(&client, CORPUS, config_with_parts(2));

    let output = pipeline
        .ask_with_diagnostics("Q")
        .await
        .expect("pipeline succeeds");

    assert_eq!(output.answer.content, "final");
    assert_eq!(client.calls_for("chunk-0").await.len(), 3);
    // 2s + 4s of backoff
    assert!(output.diagnostics.timings.query_ms >= 6_000);
    assert!(output.diagnostics.timings.total_ms >= output.diagnostics.timings.query_ms);
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let client = first_chunk_relevant();
    let pipeline = pipeline(&client, CORPUS, config_with_parts(2));

    let err = pipeline.ask("  ").await.expect_err("blank query rejected");

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(client.call_count().await, 0);
}

#[tokio::test]
async fn runs_are_independent() {
    let client = first_chunk_relevant();
    let pipeline = pipeline(&client, CORPUS, config_with_parts(2));

    let first = pipeline.ask_with_diagnostics("Q").await.expect("first run");
    let second = pipeline.ask_with_diagnostics("Q").await.expect("second run");

    assert_eq!(first.answer, second.answer);
    assert_ne!(first.diagnostics.run_id, second.diagnostics.run_id);
    assert_eq!(client.call_count().await, 6);
}

#[tokio::test]
async fn one_shot_helper_matches_pipeline() {
    let client = first_chunk_relevant();
    let dyn_client: Arc<dyn LlmClient> = client.clone();

    let result = answer(dyn_client, "Q", Corpus::from(CORPUS), config_with_parts(2))
        .await
        .expect("pipeline succeeds");

    assert_eq!(result.content, "Sentences one and two.");
    assert_eq!(
        result.to_string(),
        "Final Answer: Sentences one and two.\n\nReasoning: Merged text."
    );
}
