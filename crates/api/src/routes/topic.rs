use axum::routing::{get, post};
use axum::Router;

use crate::handlers::topic;
use crate::state::AppState;

/// Routes mounted at `/dashboard/topics`.
///
/// ```text
/// GET    /         -> list
/// POST   /         -> create
/// POST   /import   -> import (YAML body)
/// GET    /{id}     -> get_by_id
/// PUT    /{id}     -> update
/// DELETE /{id}     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(topic::list).post(topic::create))
        .route("/import", post(topic::import))
        .route(
            "/{id}",
            get(topic::get_by_id)
                .put(topic::update)
                .delete(topic::delete),
        )
}
