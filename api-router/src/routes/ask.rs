use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskParams {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub content: String,
    pub reasoning: String,
    pub rendered: String,
}

pub async fn ask(
    State(state): State<ApiState>,
    Json(input): Json<AskParams>,
) -> Result<impl IntoResponse, ApiError> {
    info!(query_chars = input.query.chars().count(), "Received ask request");

    let answer = state.pipeline.ask(&input.query).await?;
    let rendered = answer.to_string();

    Ok(Json(AskResponse {
        content: answer.content,
        reasoning: answer.reasoning,
        rendered,
    }))
}
