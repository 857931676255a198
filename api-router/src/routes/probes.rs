use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Liveness probe: 200 while the process is serving.
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Readiness probe. The corpus is loaded before the router exists, so this
/// only reports what was loaded.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    let corpus = state.pipeline.corpus();

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "checks": {
                "corpus": if corpus.is_empty() { "empty" } else { "ok" },
            },
            "corpus_bytes": corpus.len(),
        })),
    )
}
