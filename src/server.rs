//! The server module exposes the pipeline stages as JSON-over-HTTP endpoints.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

use crate::generate::ChatProviderSource;
use crate::pipeline::{TitleOutline, content_from_outline, outlines_from_titles, titles_from_sitemap};
use crate::sitemap::FetchError;

/// Shared by all handlers. Holds no connections, only the way to make them.
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn ChatProviderSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlesRequest {
    pub sitemap_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TitlesResponse {
    pub titles: Vec<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct OutlinesRequest {
    pub titles: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct OutlinesResponse {
    pub outlines: Vec<TitleOutline>,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub outline: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Request-level failure, reported as an HTTP error status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!("Request failed with {status}: {self}");

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Builds the router with permissive CORS, ready to be served.
pub fn build_app(source: Arc<dyn ChatProviderSource>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/get-titles", post(get_titles))
        .route("/api/get-outlines", post(get_outlines))
        .route("/api/generate-content", post(generate_content))
        .route("/health", get(health))
        .layer(cors)
        .with_state(AppState { source })
}

/// Binds `bind` and serves the API until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(bind: &str, source: Arc<dyn ChatProviderSource>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_app(source))
        .await
        .context("Server error")?;

    Ok(())
}

async fn get_titles(
    State(state): State<AppState>,
    Json(request): Json<TitlesRequest>,
) -> Result<Json<TitlesResponse>, ApiError> {
    let sitemap_url = request
        .sitemap_url
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::MissingField("Sitemap URL is required"))?;

    let titles = titles_from_sitemap(&sitemap_url, state.source.as_ref()).await?;
    Ok(Json(TitlesResponse { titles }))
}

async fn get_outlines(
    State(state): State<AppState>,
    Json(request): Json<OutlinesRequest>,
) -> Result<Json<OutlinesResponse>, ApiError> {
    let titles = request
        .titles
        .ok_or(ApiError::MissingField("Titles are required"))?;

    let outlines = outlines_from_titles(&titles, state.source.as_ref()).await;
    Ok(Json(OutlinesResponse { outlines }))
}

async fn generate_content(
    State(state): State<AppState>,
    Json(request): Json<ContentRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    let outline = request
        .outline
        .ok_or(ApiError::MissingField("Outline is required"))?;

    let content = content_from_outline(&outline, state.source.as_ref()).await;
    Ok(Json(ContentResponse { content }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
