///
/// This module implements the CLI interface for repo-grader: command parsing,
/// argument validation and the async entrypoint shared by `main` and tests.
///
/// All pipeline logic (locating, fetching, prompting, normalizing, fallback) lives in
/// the [`repo-grader-core`] crate. This module is strictly CLI glue.
///
/// ## Features
/// - Entry struct [`Cli`] defines all user-facing options and subcommands.
/// - `serve` starts the HTTP API; `analyze` grades one repository and prints the JSON.
/// - Async entrypoint (`run`) for programmatic invocation and integration testing.
///
/// [`repo-grader-core`]: ../../repo-grader-core/
use crate::load_config::resolve_config;
use crate::server;
use anyhow::Result;
use clap::{Parser, Subcommand};
use repo_grader_core::metadata::GitHubClient;
use repo_grader_core::model::{active_model, discover_model, GeminiClient};
use repo_grader_core::pipeline::{analyze, AnalysisRequest};
use std::path::PathBuf;

/// CLI for repo-grader: grade public GitHub repositories with a generative model.
#[derive(Parser)]
#[clap(
    name = "repo-grader",
    version,
    about = "Grade public GitHub repositories with a generative model"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the analysis API over HTTP
    Serve {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Port to listen on, overriding the config file
        #[clap(long)]
        port: Option<u16>,
    },
    /// Analyse a single repository and print the evaluation as JSON
    Analyze {
        /// Repository URL, e.g. https://github.com/owner/name
        #[clap(long)]
        url: String,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Serve { config, port } => {
            let mut config = resolve_config(config.as_deref())?;
            if let Some(port) = port {
                config.server.port = port;
            }
            tracing::info!(command = "serve", "Starting HTTP server");
            server::serve(config).await
        }
        Commands::Analyze { url, config } => {
            let request = AnalysisRequest::new(Some(url))?;
            let config = resolve_config(config.as_deref())?;
            tracing::info!(command = "analyze", url = %request.repository_url(), "Starting analysis");

            let metadata = GitHubClient::new(&config.github);
            let model = GeminiClient::new(&config.gemini);
            let (updater, active_model) = active_model(config.gemini.default_model.clone());
            // One-shot: wait for discovery so this run uses the selected model.
            discover_model(&model, &updater).await;

            let result = analyze(&request, &metadata, &model, &active_model).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            tracing::info!(command = "analyze", "Analysis printed");
            Ok(())
        }
    }
}
