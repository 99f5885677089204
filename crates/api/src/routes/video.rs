use axum::routing::get;
use axum::Router;

use crate::handlers::video;
use crate::state::AppState;

/// Routes mounted at `/dashboard/videos`.
///
/// ```text
/// GET  /   -> list (all videos, paginated)
/// POST /   -> create (appended to its playlist)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(video::list).post(video::create))
}
