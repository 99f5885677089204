pub mod health;
pub mod playlist;
pub mod public;
pub mod topic;
pub mod video;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /videos                                   visible videos, newest first
/// /series                                   playlists with visible counts
/// /series/{playlist_slug}                   playlist + visible videos
/// /series/{playlist_slug}/{video_slug}      one visible video
/// /topics                                   topics by title
/// /topics/{slug}                            topic + playlists with visible counts
///
/// /dashboard/topics                         list, create
/// /dashboard/topics/import                  YAML import (POST)
/// /dashboard/topics/{id}                    get, update, delete
///
/// /dashboard/playlists                      list (paginated), create
/// /dashboard/playlists/{id}                 get, update, delete
/// /dashboard/playlists/{id}/videos          all videos by position
/// /dashboard/playlists/{id}/videos/{video_id}       get, update, delete
/// /dashboard/playlists/{id}/videos/{video_id}/move  move up/down (PUT)
///
/// /dashboard/videos                         list all (paginated), create
/// ```
///
/// Public routes filter every read through the publication gate; dashboard
/// routes see scheduled videos too.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .nest("/dashboard", dashboard_routes())
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .nest("/topics", topic::router())
        .nest("/playlists", playlist::router())
        .nest("/videos", video::router())
}
