use std::{sync::Arc, time::Duration};

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use tracing::debug;

use super::{
    prompts::{create_user_message, document_query_schema, DOCUMENT_QUERY_SYSTEM_PROMPT},
    response::parse_llm_output,
    LlmClient, LlmDocument, LlmResponse,
};
use crate::{error::AppError, utils::config::AppConfig};

const RATE_LIMIT_CODE: &str = "rate_limit_exceeded";
const RATE_LIMIT_TYPES: [&str; 2] = ["requests", "tokens"];
const TOO_MANY_REQUESTS: u16 = 429;

/// [`LlmClient`] backed by an OpenAI-compatible chat completion endpoint.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiLlmClient {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let client = Arc::new(
            Client::with_config(
                OpenAIConfig::new()
                    .with_api_key(&config.openai_api_key)
                    .with_api_base(&config.openai_base_url),
            )
            .with_backoff(no_retry_backoff()),
        );

        Self::new(client, config.query_model.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn create_request(
        &self,
        prompt: &str,
        document: &LlmDocument,
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: Some("Relevance-aware answer over a single document".into()),
                name: "document_query".into(),
                schema: Some(document_query_schema()),
                strict: Some(true),
            },
        };

        let user_message = create_user_message(prompt, &document.name, &document.content);

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessage::from(DOCUMENT_QUERY_SYSTEM_PROMPT).into(),
                ChatCompletionRequestUserMessage::from(user_message).into(),
            ])
            .response_format(response_format)
            .build()
    }
}

#[async_trait]
impl LlmClient for OpenAiLlmClient {
    async fn query(&self, prompt: &str, document: &LlmDocument) -> Result<LlmResponse, AppError> {
        let request = self.create_request(prompt, document)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
            .ok_or(AppError::LLMParsing(
                "No content found in LLM response".into(),
            ))?;

        debug!(
            document = %document.name,
            response_chars = content.chars().count(),
            "llm response received"
        );

        parse_llm_output(content)
    }
}

/// Backoff that gives up on the first transient failure, so every 429 surfaces
/// to the caller's retry policy instead of being retried inside the client.
fn no_retry_backoff() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// Map client failures onto the error classes the query stages act on.
pub fn classify_openai_error(err: OpenAIError) -> AppError {
    match &err {
        OpenAIError::ApiError(api) if is_rate_limit(api) => {
            AppError::RateLimited(api.message.clone())
        }
        OpenAIError::Reqwest(inner)
            if inner.status().map(|status| status.as_u16()) == Some(TOO_MANY_REQUESTS) =>
        {
            AppError::RateLimited(inner.to_string())
        }
        _ => AppError::OpenAI(err),
    }
}

fn is_rate_limit(api: &ApiError) -> bool {
    // insufficient_quota shares the 429 status but never clears on its own
    if api.code.as_deref() == Some("insufficient_quota") {
        return false;
    }

    api.code.as_deref() == Some(RATE_LIMIT_CODE)
        || api
            .r#type
            .as_deref()
            .is_some_and(|kind| RATE_LIMIT_TYPES.contains(&kind))
}
