//! HTTP surface: upload a ZIP of label files, poll a job's estimate.
//!
//! ```text
//! POST {base}/upload       multipart: file, id, speed?  → converted.zip | 400 text
//! GET  {base}/status/:id   → {"labels": n, "time": secs}  (read once)
//! ```
//!
//! Every job failure is answered with `400` and the error's message as plain
//! text; per-label render failures only show up that way when they break the
//! assembly step.

use crate::config::{ConversionConfig, DEFAULT_DELAY_MS};
use crate::convert::{convert_archive, ConversionContext};
use crate::error::ZplError;
use crate::output::JobOutput;
use crate::tracker::ProgressEntry;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Settings for the HTTP listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port. Default: 9999.
    pub port: u16,
    /// Prefix for every route. Default: `/conversor-zpl`. Empty or `/`
    /// mounts the routes at the root.
    pub base_path: String,
    /// Largest accepted request body. Default: 50 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 9999,
            base_path: "/conversor-zpl".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Clone)]
struct AppState {
    config: Arc<ConversionConfig>,
    ctx: ConversionContext,
}

/// Build the application router.
///
/// `config` is the base for every job; each upload overrides its delay with
/// the request's `speed` field.
pub fn router(config: ConversionConfig, ctx: ConversionContext, server: &ServerConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        ctx,
    };

    let routes = Router::new()
        .route("/upload", post(upload))
        .route("/status/:id", get(status))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .with_state(state);

    let base = server.base_path.trim_end_matches('/');
    if base.is_empty() {
        routes
    } else if base.starts_with('/') {
        Router::new().nest(base, routes)
    } else {
        Router::new().nest(&format!("/{base}"), routes)
    }
}

/// Serve `app` until the process is stopped.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server is running on {}", addr);
    }
    axum::serve(listener, app).await
}

/// Per-label delay from the `speed` form field.
///
/// Missing, empty, non-numeric, zero or negative values fall back to
/// [`DEFAULT_DELAY_MS`]; fractions are truncated.
pub fn parse_speed(speed: Option<&str>) -> u64 {
    speed
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|ms| ms.is_finite() && *ms >= 1.0)
        .map(|ms| ms as u64)
        .unwrap_or(DEFAULT_DELAY_MS)
}

async fn upload(State(state): State<AppState>, multipart: Multipart) -> Response {
    match handle_upload(&state, multipart).await {
        Ok(output) => (
            [
                (CONTENT_TYPE, "application/zip"),
                (CONTENT_DISPOSITION, "attachment; filename=converted.zip"),
            ],
            output.archive,
        )
            .into_response(),
        Err(e) => {
            error!("{}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Json<ProgressEntry> {
    Json(state.ctx.progress.consume(&id))
}

/// Fields of the upload form.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Vec<u8>>,
    id: String,
    speed: Option<String>,
}

async fn handle_upload(state: &AppState, multipart: Multipart) -> Result<JobOutput, ZplError> {
    let form = read_form(multipart).await?;
    let archive = form.file.ok_or(ZplError::NoFileUploaded)?;
    let delay_ms = parse_speed(form.speed.as_deref());
    info!(
        "Upload for job '{}': {} bytes, {}ms per label",
        form.id,
        archive.len(),
        delay_ms
    );

    let config = state.config.with_delay_ms(delay_ms);
    convert_archive(&archive, &form.id, &config, &state.ctx).await
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ZplError> {
    let mut form = UploadForm::default();
    let invalid = |e: axum::extract::multipart::MultipartError| ZplError::InvalidUpload(e.to_string());

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => form.file = Some(field.bytes().await.map_err(invalid)?.to_vec()),
            "id" => form.id = field.text().await.map_err(invalid)?,
            "speed" => form.speed = Some(field.text().await.map_err(invalid)?),
            _ => {}
        }
    }

    Ok(form)
}
