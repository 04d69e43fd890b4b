//! Upload server
//!
//! `POST /upload` takes the client CSV either as the `file` field of a
//! multipart form or as the raw request body, and answers with the enriched
//! records as a JSON array. `GET /health` answers `ok`.
//!
//! Upload bodies are capped at [`AppState::upload_limit`] bytes; larger
//! uploads get 413.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fleetsheet_types::{CsvError, Error, Result, VehicleRecord};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::app::Pipeline;

/// Multipart field carrying the CSV
pub const UPLOAD_FIELD: &str = "file";

/// 16 MiB
pub const DEFAULT_UPLOAD_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    /// Maximum upload body size in bytes
    pub upload_limit: usize,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            upload_limit: DEFAULT_UPLOAD_LIMIT,
        }
    }

    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.upload_limit = limit;
        self
    }
}

#[derive(Serialize)]
struct ErrorDto {
    error: String,
}

/// Error returned from a handler, mapped onto an HTTP status
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Csv(_) | Error::InvalidKeys(_) => StatusCode::BAD_REQUEST,
            Error::Auth(_) | Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "Upload aborted: {}", self.0);
        } else {
            warn!(status = status.as_u16(), "Upload rejected: {}", self.0);
        }

        (
            status,
            Json(ErrorDto {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(state.upload_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn upload(
    State(state): State<AppState>,
    request: Request,
) -> std::result::Result<Json<Vec<VehicleRecord>>, Response> {
    let csv = read_upload(request, &state).await?;
    let output = state
        .pipeline
        .run_csv(&csv)
        .await
        .map_err(|e| ApiError(e).into_response())?;
    Ok(Json(output.records))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// CSV bytes from the `file` form field, or the whole body otherwise
async fn read_upload(request: Request, state: &AppState) -> std::result::Result<Bytes, Response> {
    if !is_multipart(&request) {
        return Bytes::from_request(request, state)
            .await
            .map_err(IntoResponse::into_response);
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(IntoResponse::into_response)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            debug!(file_name = field.file_name().unwrap_or("-"), "Reading multipart upload");
            return field.bytes().await.map_err(IntoResponse::into_response);
        }
    }

    Err(ApiError(
        CsvError::Parse(format!("multipart upload has no `{}` field", UPLOAD_FIELD)).into(),
    )
    .into_response())
}

async fn health() -> &'static str {
    "ok"
}

/// Serve until Ctrl-C
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %bind, upload_limit = state.upload_limit, "Upload server listening");

    axum::serve(listener, routes(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down upload server");
        })
        .await
        .map_err(|e| Error::Server(e.to_string()))
}
