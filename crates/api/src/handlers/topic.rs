//! Handlers for `/dashboard/topics`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use vidcat_core::error::CoreError;
use vidcat_core::topic_import::parse_topic_seeds;
use vidcat_core::types::DbId;
use vidcat_core::visibility::Audience;
use vidcat_db::models::topic::{CreateTopic, TopicWithPlaylists, UpdateTopic};
use vidcat_db::repositories::{PlaylistRepo, TopicRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn topic_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Topic", id })
}

/// GET /api/v1/dashboard/topics
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let topics = TopicRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: topics }))
}

/// POST /api/v1/dashboard/topics
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTopic>,
) -> AppResult<impl IntoResponse> {
    let topic = TopicRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: topic })))
}

/// POST /api/v1/dashboard/topics/import
///
/// Body is a YAML list of `{title, description, color}` entries. All topics
/// are created or none are.
pub async fn import(State(state): State<AppState>, body: String) -> AppResult<impl IntoResponse> {
    if body.trim().is_empty() {
        return Err(AppError::BadRequest("Import body is empty".into()));
    }
    let seeds = parse_topic_seeds(&body)?;
    let topics = TopicRepo::import(&state.pool, &seeds).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: topics })))
}

/// GET /api/v1/dashboard/topics/{id}
///
/// The topic with its playlists; counts include scheduled videos.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let topic = TopicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| topic_not_found(id))?;
    let playlists =
        PlaylistRepo::list_by_topic_with_counts(&state.pool, id, &Audience::Admin).await?;
    Ok(Json(DataResponse {
        data: TopicWithPlaylists { topic, playlists },
    }))
}

/// PUT /api/v1/dashboard/topics/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTopic>,
) -> AppResult<impl IntoResponse> {
    let topic = TopicRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| topic_not_found(id))?;
    Ok(Json(DataResponse { data: topic }))
}

/// DELETE /api/v1/dashboard/topics/{id}
///
/// Playlists of the topic are kept and detached.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if TopicRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(topic_not_found(id))
    }
}
