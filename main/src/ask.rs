mod bootstrap;

use answer_pipeline::AnswerConfig;
use clap::Parser;
use common::utils::config::get_config;

use bootstrap::{build_pipeline, init_tracing};

/// Ask one question against the configured corpus and print the answer.
#[derive(Debug, Parser)]
#[command(name = "ask", version)]
struct Cli {
    /// Question to answer; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Override the number of chunks the corpus is split into
    #[arg(long)]
    parts: Option<usize>,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = get_config()?;

    let mut answer_config = AnswerConfig::from_app_config(&config);
    if let Some(parts) = cli.parts {
        answer_config.tuning.chunk_parts = parts;
    }

    let pipeline = build_pipeline(&config, answer_config).await?;
    let answer = pipeline.ask(&cli.query.join(" ")).await?;

    println!("{answer}");

    Ok(())
}
