//! Built theme asset serving.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::theme::assets::ASSETS_URL_PREFIX;

/// Assets are fingerprinted, so they can be cached for 52 weeks.
pub const CACHE_CONTROL: &str = "public, max-age=31449600";

/// Directory the asset route reads from.
#[derive(Debug, Clone)]
pub struct AssetsDir(Arc<PathBuf>);

impl AssetsDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Arc::new(path.into()))
    }

    pub fn path(&self) -> &FsPath {
        &self.0
    }
}

/// Create the asset router, serving `dir` under `/_govuk_admin/`.
pub fn router<S>(dir: impl Into<PathBuf>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(&format!("{ASSETS_URL_PREFIX}/{{*path}}"), get(serve_asset))
        .with_state(AssetsDir::new(dir))
}

/// Serve one built asset.
async fn serve_asset(
    State(dir): State<AssetsDir>,
    Path(path): Path<String>,
) -> AppResult<Response> {
    let path = path.trim_start_matches('/');
    if path.contains("..") || path.contains('\0') {
        warn!(path = %path, "rejected asset path");
        return Err(AppError::NotFound);
    }

    let file_path = dir.path().join(path);

    let content = match fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                debug!(path = %file_path.display(), "asset not found");
            } else {
                warn!(path = %file_path.display(), error = %e, "failed to read asset");
            }
            return Err(AppError::NotFound);
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, mime_from_path(&file_path)),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        Body::from(content),
    )
        .into_response())
}

fn mime_from_path(path: &FsPath) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("map") | Some("json") => "application/json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
