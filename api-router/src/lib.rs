use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use routes::{
    ask::ask,
    probes::{live, ready},
};

use api_state::ApiState;

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Probes for k8s/systemd
    let probes = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    let answers = Router::new().route("/ask", post(ask));

    probes.merge(answers)
}
