//! Shared fixtures for the repository integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::PgPool;
use vidcat_core::types::{DbId, Position};
use vidcat_core::visibility::Audience;
use vidcat_db::models::playlist::{CreatePlaylist, Playlist};
use vidcat_db::models::video::{CreateVideo, Video};
use vidcat_db::repositories::{PlaylistRepo, VideoRepo};

/// A fixed instant the fixtures publish around.
pub fn launch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 18, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    launch() - Duration::days(days)
}

pub fn days_ahead(days: i64) -> DateTime<Utc> {
    launch() + Duration::days(days)
}

pub fn new_playlist(title: &str) -> CreatePlaylist {
    CreatePlaylist {
        title: title.to_string(),
        description: format!("All about {title}"),
        external_media_ref: "PL0123456789".to_string(),
        topic_id: None,
        card_ref: None,
        thumbnail_ref: None,
    }
}

/// A valid video published a day before [`launch`]. The external media id is
/// derived from `media` so tests control uniqueness.
pub fn new_video(playlist_id: DbId, title: &str, media: &str) -> CreateVideo {
    CreateVideo {
        playlist_id: Some(playlist_id),
        title: Some(title.to_string()),
        description: Some(format!("{title} explained")),
        external_media_id: Some(media.to_string()),
        duration_secs: Some(90),
        natural_duration: None,
        published_at: Some(days_ago(1)),
        unfeatured: None,
        private: None,
    }
}

pub async fn seed_playlist(pool: &PgPool, title: &str) -> Playlist {
    PlaylistRepo::create(pool, &new_playlist(title)).await.unwrap()
}

pub async fn seed_video(pool: &PgPool, playlist_id: DbId, title: &str, media: &str) -> Video {
    VideoRepo::create(pool, &new_video(playlist_id, title, media))
        .await
        .unwrap()
}

/// `(title, position)` pairs of a playlist in position order, admin view.
pub async fn ordering(pool: &PgPool, playlist_id: DbId) -> Vec<(String, Position)> {
    VideoRepo::list_in_playlist(pool, playlist_id, &Audience::Admin)
        .await
        .unwrap()
        .into_iter()
        .map(|v| (v.title, v.position))
        .collect()
}

pub fn expected(order: &[(&str, Position)]) -> Vec<(String, Position)> {
    order.iter().map(|(t, p)| (t.to_string(), *p)).collect()
}
