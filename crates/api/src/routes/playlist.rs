use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{playlist, video};
use crate::state::AppState;

/// Routes mounted at `/dashboard/playlists`.
///
/// ```text
/// GET    /                                -> list
/// POST   /                                -> create
/// GET    /{id}                            -> get_by_id
/// PUT    /{id}                            -> update
/// DELETE /{id}                            -> delete
/// GET    /{id}/videos                     -> list videos by position
/// GET    /{id}/videos/{video_id}          -> video::get_by_id
/// PUT    /{id}/videos/{video_id}          -> video::update
/// DELETE /{id}/videos/{video_id}          -> video::delete
/// PUT    /{id}/videos/{video_id}/move     -> video::move_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(playlist::list).post(playlist::create))
        .route(
            "/{id}",
            get(playlist::get_by_id)
                .put(playlist::update)
                .delete(playlist::delete),
        )
        .route("/{id}/videos", get(playlist::list_videos))
        .route(
            "/{id}/videos/{video_id}",
            get(video::get_by_id).put(video::update).delete(video::delete),
        )
        .route("/{id}/videos/{video_id}/move", put(video::move_video))
}
