//! GOV.UK admin theme server.
//!
//! Serves the built theme assets under `/_govuk_admin/`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use govuk_admin::config::Config;
use govuk_admin::routes;
use govuk_admin::theme::{AssetManifest, SharedThemeEngine, ThemeEngine};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        port = config.port,
        assets_dir = %config.assets_dir.display(),
        page_size = config.page_size,
        "Configuration loaded"
    );

    let manifest = config
        .manifest_path
        .as_deref()
        .map(AssetManifest::load)
        .transpose()
        .context("failed to load asset manifest")?;

    // Fails early when the manifest lacks the theme entries
    let theme: SharedThemeEngine = Arc::new(
        ThemeEngine::new(config.service_name.clone(), manifest.as_ref())
            .context("failed to initialize theme engine")?,
    );
    info!(?theme, "Theme loaded");

    let app = Router::new()
        .merge(routes::assets::router(config.assets_dir.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,govuk_admin=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
