//! HTTP surface for video generation.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::app_config::ServerConfig;
use crate::errors::GenerationError;
use crate::language_utils::{LanguageInfo, language_catalog};
use crate::orchestrator::{CancelSignal, GenerationOutcome, GenerationRequest, Orchestrator};
use crate::render_service::{MovieStatus, RenderState};
use crate::timeline::WordPair;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: &'static [LanguageInfo],
}

/// Answer to a generation request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    /// Render job id to poll; absent on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub message: String,
    pub timestamp: String,
    pub generated_words: Vec<WordPair>,
}

impl GenerateResponse {
    fn accepted(outcome: GenerationOutcome) -> Self {
        let found = outcome.word_pairs.len();
        let message = if found < outcome.word_count as usize {
            format!(
                "Video submitted with {} of {} requested words ({:.1}s)",
                found, outcome.word_count, outcome.timeline_duration
            )
        } else {
            format!("Video submitted with {} words ({:.1}s)", found, outcome.timeline_duration)
        };

        Self {
            success: true,
            project_id: Some(outcome.job.job_id),
            message,
            timestamp: outcome.job.submitted_at.to_rfc3339(),
            generated_words: outcome.word_pairs,
        }
    }

    fn failed(error: &GenerationError) -> Self {
        Self {
            success: false,
            project_id: None,
            message: error.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            generated_words: Vec::new(),
        }
    }
}

/// Answer to a status query
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RenderState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitles_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendering_time: Option<f64>,
}

impl From<MovieStatus> for StatusReply {
    fn from(movie: MovieStatus) -> Self {
        Self {
            success: true,
            status: Some(movie.status),
            url: movie.url,
            subtitles_url: movie.subtitles_url,
            message: movie.message,
            created_at: movie.created_at,
            ended_at: movie.ended_at,
            duration: movie.duration,
            size: movie.size,
            width: movie.width,
            height: movie.height,
            rendering_time: movie.rendering_time,
        }
    }
}

/// HTTP status for a failed request
pub fn status_code_for(error: &GenerationError) -> StatusCode {
    match error {
        e if e.is_rejection() => StatusCode::BAD_REQUEST,
        GenerationError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn list_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: language_catalog(),
    })
}

// The request future is dropped when the client disconnects, which stops the pipeline
pub async fn generate_video(
    State(state): State<AppState>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected malformed generation request: {}", rejection.body_text());
            let error = GenerationError::Validation(format!("Invalid request body: {}", rejection.body_text()));
            return (status_code_for(&error), Json(GenerateResponse::failed(&error))).into_response();
        }
    };

    match state.orchestrator.generate(&request, &CancelSignal::never()).await {
        Ok(outcome) => Json(GenerateResponse::accepted(outcome)).into_response(),
        Err(e) => (status_code_for(&e), Json(GenerateResponse::failed(&e))).into_response(),
    }
}

pub async fn video_status(State(state): State<AppState>, Path(job_id): Path<String>) -> Response {
    match state.orchestrator.status(&job_id, &CancelSignal::never()).await {
        Ok(movie) => Json(StatusReply::from(movie)).into_response(),
        Err(e) => (
            status_code_for(&e),
            Json(StatusReply {
                success: false,
                message: Some(e.to_string()),
                ..Default::default()
            }),
        )
            .into_response(),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/languages", get(list_languages))
        .route("/api/videos", post(generate_video))
        .route("/api/videos/{job_id}", get(video_status))
        .with_state(state)
}

/// Router with the configured middleware applied
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    let app = router(state);
    if !config.cors {
        return app;
    }

    info!("CORS enabled for all origins");
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    app.layer(cors)
}

/// Serve until Ctrl-C
pub async fn serve(config: &ServerConfig, orchestrator: Orchestrator) -> anyhow::Result<()> {
    let app = app(AppState::new(orchestrator), config);

    let addr: std::net::SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /health                - Health check");
    info!("  GET  /api/languages         - Supported languages and voices");
    info!("  POST /api/videos            - Generate a vocabulary video");
    info!("  GET  /api/videos/{{job_id}}   - Render job status");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
