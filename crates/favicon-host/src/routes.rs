//! HTTP surface: multipart intake, package generation, error mapping

use crate::config::ServerConfig;
use anyhow::{anyhow, Context};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use favicon_tools::archive::{ARCHIVE_FILE_NAME, ARCHIVE_MIME};
use favicon_tools::{CancelFlag, FaviconGenerator, GenerationParams, HexColor, SourceImage};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

#[derive(Clone, Default)]
pub struct AppState {
    generator: Arc<FaviconGenerator>,
}

impl AppState {
    pub fn new(generator: FaviconGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Request outcome that is not an archive. Only the code reaches the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no image in submission")]
    NoFile,

    #[error(transparent)]
    Server(#[from] anyhow::Error),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NoFile => "NO_FILE",
            ApiError::Server(_) => "SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFile => StatusCode::BAD_REQUEST,
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::NoFile => warn!("image-generator request without image"),
            ApiError::Server(e) => error!("image-generator error: {:#}", e),
        }
        (self.status(), Json(json!({ "error": self.code() }))).into_response()
    }
}

// ============================================================================
// Form
// ============================================================================

/// Raw multipart fields, before any interpretation
#[derive(Debug, Default)]
pub struct UploadForm {
    pub image: Option<SourceImage>,
    pub padding: Option<String>,
    pub radius: Option<String>,
    pub transparent_bg: Option<String>,
    pub background_color: Option<String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| anyhow!("reading multipart field: {}", e))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().map(str::to_owned);
                    let mime = field.content_type().map(str::to_owned);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| anyhow!("reading image field: {}", e))?;

                    // Browsers send an empty part when no file was picked
                    if bytes.is_empty() {
                        continue;
                    }

                    debug!(bytes = bytes.len(), mime = ?mime, file_name = ?file_name, "image field");
                    let mut source = SourceImage::new(bytes.to_vec(), mime);
                    if let Some(file_name) = file_name {
                        source = source.with_file_name(file_name);
                    }
                    form.image = Some(source);
                }
                "padding" => form.padding = Some(read_text(field).await?),
                "radius" => form.radius = Some(read_text(field).await?),
                "transparentBg" => form.transparent_bg = Some(read_text(field).await?),
                "backgroundColor" => form.background_color = Some(read_text(field).await?),
                other => debug!(field = other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    pub fn params(&self) -> GenerationParams {
        let params = GenerationParams::new(
            parse_percent(self.padding.as_deref()),
            parse_percent(self.radius.as_deref()),
            parse_flag(self.transparent_bg.as_deref()),
            parse_color(self.background_color.as_deref()),
        );

        // The manifest repeats a valid color exactly as submitted
        match self.background_color.as_deref() {
            Some(raw) if HexColor::parse(raw).is_some() => params.with_background_text(raw),
            _ => params,
        }
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    let name = field.name().unwrap_or_default().to_owned();
    field
        .text()
        .await
        .map_err(|e| ApiError::Server(anyhow!("reading field {}: {}", name, e)))
}

/// Percent field; missing or unparseable values count as 0
pub fn parse_percent(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Only the exact string "true" enables a flag
pub fn parse_flag(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Hex color field; missing means white, invalid falls back to white
pub fn parse_color(value: Option<&str>) -> HexColor {
    match value {
        None => HexColor::WHITE,
        Some(raw) => HexColor::parse(raw).unwrap_or_else(|| {
            warn!(value = raw, "unparseable backgroundColor, using white");
            HexColor::WHITE
        }),
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route(&config.route, post(generate_package))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state)
}

#[instrument(skip_all)]
async fn generate_package(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let multipart = multipart.map_err(|e| anyhow!("reading form: {}", e))?;
    let form = UploadForm::read(multipart).await?;
    let params = form.params();
    let source = form.image.ok_or(ApiError::NoFile)?;

    debug!(
        padding = params.padding(),
        radius = params.corner_radius(),
        transparent = params.transparent_background(),
        "generating package"
    );

    // Dropping this future (client gone) drops the guard and stops the job
    let cancel = CancelFlag::new();
    let _guard = cancel.drop_guard();

    let generator = Arc::clone(&state.generator);
    let archive = tokio::task::spawn_blocking(move || {
        generator.generate_package_cancellable(&source, &params, &cancel)
    })
    .await
    .context("generation task failed")?
    .map_err(anyhow::Error::from)?;

    info!(bytes = archive.len(), "package generated");
    let disposition = format!("attachment; filename=\"{}\"", ARCHIVE_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, ARCHIVE_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// ============================================================================
// Tests
// ============================================================================
