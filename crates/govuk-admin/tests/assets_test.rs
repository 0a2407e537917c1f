#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Asset route tests.

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use govuk_admin::routes::assets;

/// Fresh asset directory holding one stylesheet.
fn asset_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("govuk-admin-assets-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("main-4f2a.css"), "body{margin:0}").unwrap();
    dir
}

async fn get(dir: PathBuf, uri: &str) -> axum::response::Response {
    assets::router::<()>(dir)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_serves_asset_with_long_cache() {
    let dir = asset_dir();
    let response = get(dir.clone(), "/_govuk_admin/main-4f2a.css").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=31449600"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"body{margin:0}");

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_missing_asset_is_not_found() {
    let dir = asset_dir();
    let response = get(dir.clone(), "/_govuk_admin/missing.js").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_traversal_is_rejected() {
    let dir = asset_dir();
    std::fs::write(dir.join("secret.txt"), "secret").unwrap();
    let nested = dir.join("nested");
    std::fs::create_dir_all(&nested).unwrap();

    let response = get(nested, "/_govuk_admin/..%2Fsecret.txt").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_other_paths_are_not_routed() {
    let dir = asset_dir();
    let response = get(dir.clone(), "/static/main-4f2a.css").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(dir).unwrap();
}
