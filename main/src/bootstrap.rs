use std::sync::Arc;

use answer_pipeline::{AnswerConfig, AnswerPipeline};
use common::{
    corpus::{load_corpus, Corpus},
    llm::OpenAiLlmClient,
    storage::store::StorageManager,
    utils::config::AppConfig,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

/// Load the corpus once. A storage failure leaves the service running on an
/// empty corpus, which answers every query with "no relevant information".
pub async fn load_corpus_or_empty(storage: &StorageManager, config: &AppConfig) -> Corpus {
    match load_corpus(storage, config.corpus_prefix.as_deref()).await {
        Ok(corpus) => {
            info!(
                backend = ?storage.backend_kind(),
                corpus_bytes = corpus.len(),
                "Corpus loaded"
            );
            corpus
        }
        Err(err) => {
            error!(error = %err, "Failed to load corpus; continuing with an empty corpus");
            Corpus::default()
        }
    }
}

pub async fn build_pipeline(
    config: &AppConfig,
    answer_config: AnswerConfig,
) -> Result<AnswerPipeline, Box<dyn std::error::Error>> {
    let storage = StorageManager::new(config).await?;
    let corpus = load_corpus_or_empty(&storage, config).await;
    let client = Arc::new(OpenAiLlmClient::from_config(config));

    info!(
        model = %client.model(),
        chunk_parts = answer_config.tuning.chunk_parts,
        retry_synthesis = answer_config.retry_synthesis,
        "Answer pipeline initialized"
    );

    Ok(AnswerPipeline::new(client, corpus, answer_config))
}
