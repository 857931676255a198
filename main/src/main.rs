mod bootstrap;

use api_router::{api_routes_v1, api_state::ApiState};
use answer_pipeline::AnswerConfig;
use axum::Router;
use common::utils::config::get_config;
use tower_http::trace::TraceLayer;
use tracing::info;

use bootstrap::{build_pipeline, init_tracing};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = get_config()?;
    let pipeline = build_pipeline(&config, AnswerConfig::from_app_config(&config)).await?;
    let api_state = ApiState::new(pipeline);

    let app = app(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(api_state: ApiState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes_v1())
        .layer(TraceLayer::new_for_http())
        .with_state(api_state)
}
