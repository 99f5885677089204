//! Handlers for `/dashboard/playlists`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use vidcat_core::error::CoreError;
use vidcat_core::types::DbId;
use vidcat_core::visibility::Audience;
use vidcat_db::models::playlist::{CreatePlaylist, PlaylistDetail, UpdatePlaylist};
use vidcat_db::models::video::VideoResponse;
use vidcat_db::repositories::{PlaylistRepo, VideoRepo};

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn playlist_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Playlist",
        id,
    })
}

/// All videos of a playlist by position, scheduled ones included.
async fn admin_videos(state: &AppState, id: DbId) -> AppResult<Vec<VideoResponse>> {
    let now = state.now();
    let videos = VideoRepo::list_in_playlist(&state.pool, id, &Audience::Admin).await?;
    Ok(videos
        .into_iter()
        .map(|v| VideoResponse::new(v, now))
        .collect())
}

/// GET /api/v1/dashboard/playlists?limit=&offset=
///
/// Most recently updated first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.window();
    let playlists = PlaylistRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: playlists }))
}

/// POST /api/v1/dashboard/playlists
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePlaylist>,
) -> AppResult<impl IntoResponse> {
    let playlist = PlaylistRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: playlist })))
}

/// GET /api/v1/dashboard/playlists/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let playlist = PlaylistRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| playlist_not_found(id))?;
    let videos = admin_videos(&state, id).await?;
    Ok(Json(DataResponse {
        data: PlaylistDetail { playlist, videos },
    }))
}

/// GET /api/v1/dashboard/playlists/{id}/videos
pub async fn list_videos(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    PlaylistRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| playlist_not_found(id))?;
    let videos = admin_videos(&state, id).await?;
    Ok(Json(DataResponse { data: videos }))
}

/// PUT /api/v1/dashboard/playlists/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlaylist>,
) -> AppResult<impl IntoResponse> {
    let playlist = PlaylistRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| playlist_not_found(id))?;
    Ok(Json(DataResponse { data: playlist }))
}

/// DELETE /api/v1/dashboard/playlists/{id}
///
/// Refused with 409 while the playlist still holds videos.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if PlaylistRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(playlist_not_found(id))
    }
}
