//! Route definitions for public, gated reads.

use axum::routing::get;
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes merged at the `/api/v1` root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/videos", get(public::list_videos))
        .route("/series", get(public::list_series))
        .route("/series/{playlist_slug}", get(public::show_series))
        .route("/series/{playlist_slug}/{video_slug}", get(public::show_video))
        .route("/topics", get(public::list_topics))
        .route("/topics/{slug}", get(public::show_topic))
}
