//! HTTP-level integration tests for the public, gated endpoints.
//!
//! The test clock is pinned, so "scheduled" and "visible" are decided by the
//! instant a router is built with rather than by wall-clock time.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{
    body_json, build_test_app, build_test_app_at, create_playlist, create_video, get, launch,
    post_json,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_series_counts_only_visible_videos(pool: PgPool) {
    let playlist_id = create_playlist(&pool, "Counting").await;
    create_video(&pool, playlist_id, "One", "vid1", launch() - Duration::days(2)).await;
    create_video(&pool, playlist_id, "Two", "vid2", launch() - Duration::hours(1)).await;
    create_video(&pool, playlist_id, "Three", "vid3", launch() + Duration::days(1)).await;

    let response = get(build_test_app(pool.clone()), "/api/v1/series").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["video_count"], 2);

    let response = get(build_test_app(pool), "/api/v1/series/counting").await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["slug"], "counting");
    let titles: Vec<&str> = json["data"]["videos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["One", "Two"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_scheduled_video_is_404_until_published(pool: PgPool) {
    let playlist_id = create_playlist(&pool, "Premieres").await;
    let release = launch() + Duration::days(1);
    create_video(&pool, playlist_id, "Premiere", "vid1", release).await;
    let uri = "/api/v1/series/premieres/premiere";

    let response = get(build_test_app(pool.clone()), uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(build_test_app_at(pool.clone(), release), uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["visibility"], "visible");

    let response = get(
        build_test_app_at(pool, release + Duration::days(1)),
        "/api/v1/series",
    )
    .await;
    assert_eq!(body_json(response).await["data"][0]["video_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_same_video_slug_in_two_series(pool: PgPool) {
    let first = create_playlist(&pool, "First Series").await;
    let second = create_playlist(&pool, "Second Series").await;
    create_video(&pool, first, "Sample", "vid1", launch()).await;
    create_video(&pool, second, "Sample", "vid2", launch()).await;

    for series in ["first-series", "second-series"] {
        let response = get(
            build_test_app(pool.clone()),
            &format!("/api/v1/series/{series}/sample"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "series {series}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_series_returns_404(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/series/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_video_feed_is_newest_first_and_paginated(pool: PgPool) {
    let playlist_id = create_playlist(&pool, "Feed").await;
    create_video(&pool, playlist_id, "Old", "vid1", launch() - Duration::days(9)).await;
    create_video(&pool, playlist_id, "New", "vid2", launch() - Duration::days(1)).await;
    create_video(&pool, playlist_id, "Mid", "vid3", launch() - Duration::days(5)).await;
    create_video(&pool, playlist_id, "Soon", "vid4", launch() + Duration::days(5)).await;

    let response = get(build_test_app(pool.clone()), "/api/v1/videos").await;
    let json = body_json(response).await;
    let titles: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["New", "Mid", "Old"]);

    let response = get(build_test_app(pool), "/api/v1/videos?limit=1&offset=1").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["title"], "Mid");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_topic_page_counts_visible_videos(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/dashboard/topics",
        json!({"title": "Git", "description": "Version control"}),
    )
    .await;
    let topic_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/dashboard/playlists",
        json!({
            "title": "Git Basics",
            "description": "Start here",
            "external_media_ref": "PL1",
            "topic_id": topic_id,
        }),
    )
    .await;
    let playlist_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    create_video(&pool, playlist_id, "Commits", "vid1", launch()).await;
    create_video(&pool, playlist_id, "Rebase", "vid2", launch() + Duration::days(2)).await;

    let response = get(build_test_app(pool.clone()), "/api/v1/topics/git").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["playlists"][0]["video_count"], 1);

    let response = get(
        build_test_app(pool),
        &format!("/api/v1/dashboard/topics/{topic_id}"),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["playlists"][0]["video_count"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_reports_database(pool: PgPool) {
    let response = get(build_test_app(pool), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}
