//! JSON endpoint handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::crawler::{self, CrawlError};
use crate::models::MediaAsset;
use crate::profile;

use super::AppState;

/// Request body shared by both endpoints.
#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CrawlResponse {
    pub assets: Vec<MediaAsset>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    fn response(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
        (status, Json(ErrorBody { error: error.into() })).into_response()
    }
}

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Crawl a listing page for media assets. A partially-successful crawl
/// returns 200 with whatever was found, even if nothing; only
/// navigation-level failures produce an error response.
pub async fn crawl_media(
    State(state): State<AppState>,
    Json(request): Json<TargetRequest>,
) -> impl IntoResponse {
    info!("Crawling listing media from {}", request.url);

    match crawler::run_crawl(&request.url, &state.settings.browser).await {
        Ok(assets) => (StatusCode::OK, Json(CrawlResponse { assets })).into_response(),
        Err(e) => {
            error!("Crawl of {} failed: {}", request.url, e);
            let status = match &e {
                CrawlError::Navigation(_) => StatusCode::BAD_GATEWAY,
                CrawlError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                CrawlError::Launch(_) | CrawlError::Browser(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            ErrorBody::response(status, e.to_string())
        }
    }
}

/// Fetch an agent profile page and run the static extractor over it.
/// Extraction itself never fails; only the fetch can.
pub async fn extract_profile(
    State(state): State<AppState>,
    Json(request): Json<TargetRequest>,
) -> impl IntoResponse {
    info!("Extracting agent profile from {}", request.url);

    let response = match state.http.get(&request.url).send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Profile fetch of {} failed: {}", request.url, e);
            return ErrorBody::response(
                StatusCode::BAD_GATEWAY,
                format!("failed to fetch {}: {e}", request.url),
            );
        }
    };

    let status = response.status();
    if !status.is_success() {
        error!("Profile fetch of {} returned HTTP {}", request.url, status);
        return ErrorBody::response(
            StatusCode::BAD_GATEWAY,
            format!("{} returned HTTP {status}", request.url),
        );
    }

    let html = match response.text().await {
        Ok(html) => html,
        Err(e) => {
            error!("Profile body read of {} failed: {}", request.url, e);
            return ErrorBody::response(
                StatusCode::BAD_GATEWAY,
                format!("failed to read {}: {e}", request.url),
            );
        }
    };

    let extraction = profile::extract_profile(&html, &request.url);
    (StatusCode::OK, Json(extraction)).into_response()
}
