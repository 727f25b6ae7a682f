//! HTTP surface: `POST /api/analyze` and `GET /health`.
//!
//! The analyze route answers `200` with an evaluation on every path except a
//! missing URL, which is the only `400`. Pipeline failures never change the
//! status code; they only show up in the logs.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use repo_grader_core::contract::{MetadataSource, ModelClient};
use repo_grader_core::metadata::GitHubClient;
use repo_grader_core::model::{active_model, discover_model, ActiveModel, GeminiClient};
use repo_grader_core::pipeline::{analyze, AnalysisRequest};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::load_config::{AppConfig, ServerConfig};

/// Shared, read-only collaborators for every request.
#[derive(Clone)]
pub struct AppState {
    pub metadata: Arc<dyn MetadataSource>,
    pub model: Arc<dyn ModelClient>,
    pub active_model: ActiveModel,
}

#[derive(Debug, Deserialize)]
struct AnalyzeBody {
    url: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_repository))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn analyze_repository(State(state): State<AppState>, body: Bytes) -> Response {
    // Anything that isn't a JSON object with a string `url` counts as no URL.
    let url = serde_json::from_slice::<AnalyzeBody>(&body)
        .ok()
        .and_then(|b| b.url);

    let request = match AnalysisRequest::new(url) {
        Ok(request) => request,
        Err(e) => {
            info!("[API] Rejected analyze request without URL");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let result = analyze(
        &request,
        state.metadata.as_ref(),
        state.model.as_ref(),
        &state.active_model,
    )
    .await;

    Json(result).into_response()
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.active_model.current(),
    }))
}

/// Builds the production clients, starts model discovery in the background
/// and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: AppConfig) -> Result<()> {
    let metadata: Arc<dyn MetadataSource> = Arc::new(GitHubClient::new(&config.github));
    let model: Arc<dyn ModelClient> = Arc::new(GeminiClient::new(&config.gemini));
    let (updater, active_model) = active_model(config.gemini.default_model.clone());

    // Requests arriving before this finishes use the default model.
    let discovery_client = Arc::clone(&model);
    tokio::spawn(async move {
        discover_model(discovery_client.as_ref(), &updater).await;
    });

    let app = create_router(AppState {
        metadata,
        model,
        active_model,
    });

    let listener = bind_listener(&config.server).await?;
    let addr = listener.local_addr().context("listener has no local address")?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Binds `host:port`. The host may be an IP address or a resolvable name.
pub async fn bind_listener(server: &ServerConfig) -> Result<TcpListener> {
    let host = server.host.as_str();
    let port = server.port;
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
