//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Service name shown in the page header.
    pub service_name: Option<String>,

    /// Directory of built theme assets (default: ./static/dist/assets).
    pub assets_dir: PathBuf,

    /// Vite manifest of the built assets. Without one, pages carry no theme CSS/JS.
    pub manifest_path: Option<PathBuf>,

    /// Rows per list page (default: 20).
    pub page_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let service_name = env::var("GOVUK_ADMIN_SERVICE_NAME")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let assets_dir = env::var("GOVUK_ADMIN_ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./static/dist/assets"));

        let manifest_path = env::var("GOVUK_ADMIN_MANIFEST").ok().map(PathBuf::from);

        let page_size: usize = env::var("GOVUK_ADMIN_PAGE_SIZE")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .context("GOVUK_ADMIN_PAGE_SIZE must be a valid usize")?;
        if page_size == 0 {
            anyhow::bail!("GOVUK_ADMIN_PAGE_SIZE must be at least 1");
        }

        Ok(Self {
            port,
            service_name,
            assets_dir,
            manifest_path,
            page_size,
        })
    }
}
