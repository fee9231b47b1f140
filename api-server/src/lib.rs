//! HTTP boundary for redlens.
//!
//! Exposes the analysis endpoint and a health check. Built on Axum.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

use llm_interface::{LlmProvider, OpenAiProvider};
use reddit_client::{RedditClient, UserHistoryProvider};
use redlens_core::{AnalysisParameters, AnalysisResult, AppConfig, CoreError, ErrorExt};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<dyn UserHistoryProvider>,
    pub llm: Arc<dyn LlmProvider>,
}

impl AppState {
    pub fn new(history: Arc<dyn UserHistoryProvider>, llm: Arc<dyn LlmProvider>) -> Self {
        Self { history, llm }
    }
}

/// Build the Axum router with all routes and layers.
///
/// CORS is wide open: the service is consumed from browser frontends on
/// arbitrary origins and carries no cookies or credentials.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/analyze", post(analyze_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server against the live Reddit and OpenAI backends.
///
/// Blocks until the server shuts down.
pub async fn start(config: AppConfig) -> Result<(), CoreError> {
    let addr = config.bind_addr();
    let state = AppState::new(
        Arc::new(RedditClient::new(config.reddit)),
        Arc::new(OpenAiProvider::new(config.openai_api_key)),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CoreError::Internal {
            message: format!("failed to bind {addr}: {e}"),
        })?;
    info!(%addr, "Redlens API listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| CoreError::Internal {
            message: format!("server error: {e}"),
        })?;

    Ok(())
}

#[derive(Debug, Deserialize)]
struct AnalyzeUserRequest {
    user_id: String,
    user_to_search: String,
    parameters: AnalysisParameters,
}

#[derive(Serialize)]
struct HealthResponse {
    message: &'static str,
    status: &'static str,
}

async fn root_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Redlens API is running",
        status: "healthy",
    })
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeUserRequest>,
) -> (StatusCode, Json<AnalysisResult>) {
    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        caller = %request.user_id,
        target = %request.user_to_search,
        "Analysis requested"
    );

    match run_analysis(&state, &request).await {
        Ok(summary) => {
            info!(%request_id, "Analysis completed");
            (
                StatusCode::OK,
                Json(AnalysisResult::success(
                    request.user_id,
                    request.user_to_search,
                    summary,
                )),
            )
        }
        Err(err) => {
            err.log_error();
            let status = error_status(&err);
            (
                status,
                Json(AnalysisResult::failure(
                    request.user_id,
                    request.user_to_search,
                    &err,
                )),
            )
        }
    }
}

/// Fetch, then summarize. Either stage failing aborts the whole request;
/// partial results are never returned.
async fn run_analysis(
    state: &AppState,
    request: &AnalyzeUserRequest,
) -> Result<String, CoreError> {
    if request.user_to_search.trim().is_empty() {
        return Err(CoreError::InvalidInput {
            message: "user_to_search must not be empty".to_string(),
        });
    }
    request.parameters.validate()?;

    let corpus = state
        .history
        .fetch_user_history(&request.user_to_search, &request.parameters.fetch)
        .await?;

    let summary = state
        .llm
        .summarize(
            &request.user_to_search,
            &corpus,
            &request.parameters.summary,
        )
        .await?;

    Ok(summary)
}

/// Maps pipeline failures to HTTP statuses by stage: anything that went
/// wrong while talking to Reddit is a caller problem, anything that went
/// wrong while summarizing is ours.
fn error_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Reddit(_) => StatusCode::BAD_REQUEST,
        CoreError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
