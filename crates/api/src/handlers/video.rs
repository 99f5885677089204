//! Handlers for dashboard video management.
//!
//! Videos are addressed through their playlist
//! (`/dashboard/playlists/{id}/videos/{video_id}`) for every operation that
//! touches ordering; creation and the flat listing live at
//! `/dashboard/videos`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use vidcat_core::error::CoreError;
use vidcat_core::types::DbId;
use vidcat_core::visibility::Audience;
use vidcat_db::models::video::{CreateVideo, MoveVideo, UpdateVideo, VideoResponse};
use vidcat_db::repositories::VideoRepo;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn video_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Video", id })
}

/// GET /api/v1/dashboard/videos?limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.window();
    let now = state.now();
    let videos = VideoRepo::list(&state.pool, &Audience::Admin, limit, offset).await?;
    let data: Vec<VideoResponse> = videos
        .into_iter()
        .map(|v| VideoResponse::new(v, now))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/dashboard/videos
///
/// The video is appended to the end of `playlist_id`.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateVideo>,
) -> AppResult<impl IntoResponse> {
    let video = VideoRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: VideoResponse::new(video, state.now()),
        }),
    ))
}

/// GET /api/v1/dashboard/playlists/{id}/videos/{video_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((playlist_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let video = VideoRepo::find_in_playlist(&state.pool, playlist_id, id)
        .await?
        .ok_or_else(|| video_not_found(id))?;
    Ok(Json(DataResponse {
        data: VideoResponse::new(video, state.now()),
    }))
}

/// PUT /api/v1/dashboard/playlists/{id}/videos/{video_id}
pub async fn update(
    State(state): State<AppState>,
    Path((playlist_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateVideo>,
) -> AppResult<impl IntoResponse> {
    let video = VideoRepo::update(&state.pool, playlist_id, id, &input)
        .await?
        .ok_or_else(|| video_not_found(id))?;
    Ok(Json(DataResponse {
        data: VideoResponse::new(video, state.now()),
    }))
}

/// PUT /api/v1/dashboard/playlists/{id}/videos/{video_id}/move
///
/// Body: `{"direction": "up" | "down"}`. Moving past either end is a no-op
/// and still answers 200 with the unchanged video.
pub async fn move_video(
    State(state): State<AppState>,
    Path((playlist_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<MoveVideo>,
) -> AppResult<impl IntoResponse> {
    let direction = input.direction()?;
    let video = VideoRepo::move_video(&state.pool, playlist_id, id, direction).await?;
    Ok(Json(DataResponse {
        data: VideoResponse::new(video, state.now()),
    }))
}

/// DELETE /api/v1/dashboard/playlists/{id}/videos/{video_id}
///
/// Later videos in the playlist move up one place.
pub async fn delete(
    State(state): State<AppState>,
    Path((playlist_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    VideoRepo::delete(&state.pool, playlist_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
