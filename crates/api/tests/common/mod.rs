//! Shared helpers for HTTP-level integration tests.
//!
//! Requests go straight to the router through `tower::ServiceExt::oneshot`,
//! without a TCP listener.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use vidcat_api::config::ServerConfig;
use vidcat_api::router::build_app_router;
use vidcat_api::state::AppState;
use vidcat_core::visibility::FixedClock;

/// The instant the test clock is pinned to unless a test picks another.
pub fn launch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 18, 12, 0, 0).unwrap()
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Build the full application router with the clock pinned to [`launch`].
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_at(pool, launch())
}

/// Build the full application router with the clock pinned to `now`.
pub fn build_test_app_at(pool: PgPool, now: DateTime<Utc>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        clock: Arc::new(FixedClock(now)),
    };
    build_app_router(state, &config)
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::delete(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, "POST", uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, "PUT", uri, body).await
}

pub async fn post_text(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/yaml")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a playlist through the API and return its id.
pub async fn create_playlist(pool: &PgPool, title: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/dashboard/playlists",
        serde_json::json!({
            "title": title,
            "description": format!("All about {title}"),
            "external_media_ref": "PL0123456789",
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a video through the API and return its JSON representation.
pub async fn create_video(
    pool: &PgPool,
    playlist_id: i64,
    title: &str,
    media: &str,
    published_at: DateTime<Utc>,
) -> serde_json::Value {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/dashboard/videos",
        serde_json::json!({
            "playlist_id": playlist_id,
            "title": title,
            "description": format!("{title} explained"),
            "external_media_id": media,
            "duration_secs": 95,
            "published_at": published_at,
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"].clone()
}
