//! Scriptable [`LlmClient`] for tests.

use std::time::Duration;

use async_trait::async_trait;
use tokio::{sync::Mutex, time::Instant};

use super::{LlmClient, LlmDocument, LlmResponse};
use crate::error::AppError;

/// A call observed by [`ScriptedLlmClient`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub document: LlmDocument,
    /// 1-based attempt number for this document name.
    pub attempt: usize,
    pub at: Instant,
}

type Responder = Box<dyn Fn(&RecordedCall) -> Result<LlmResponse, AppError> + Send + Sync>;
type Latency = Box<dyn Fn(&LlmDocument) -> Duration + Send + Sync>;

pub struct ScriptedLlmClient {
    responder: Responder,
    latency: Option<Latency>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedLlmClient {
    pub fn new(
        responder: impl Fn(&RecordedCall) -> Result<LlmResponse, AppError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Delay every answer by the returned duration before responding.
    #[must_use]
    pub fn with_latency(
        mut self,
        latency: impl Fn(&LlmDocument) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.latency = Some(Box::new(latency));
        self
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn calls_for(&self, document_name: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.document.name == document_name)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn query(&self, prompt: &str, document: &LlmDocument) -> Result<LlmResponse, AppError> {
        let call = {
            let mut calls = self.calls.lock().await;
            let previous = calls
                .iter()
                .filter(|call| call.document.name == document.name)
                .count();
            let call = RecordedCall {
                prompt: prompt.to_string(),
                document: document.clone(),
                attempt: previous.saturating_add(1),
                at: Instant::now(),
            };
            calls.push(call.clone());
            call
        };

        if let Some(latency) = &self.latency {
            tokio::time::sleep(latency(document)).await;
        }

        (self.responder)(&call)
    }
}

pub fn relevant(content: &str, reasoning: &str) -> LlmResponse {
    LlmResponse {
        content: content.to_string(),
        reasoning: reasoning.to_string(),
        is_irrelevant: false,
    }
}

pub fn irrelevant() -> LlmResponse {
    LlmResponse {
        content: String::new(),
        reasoning: "The document does not address the question.".to_string(),
        is_irrelevant: true,
    }
}
