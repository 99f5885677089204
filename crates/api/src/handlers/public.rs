//! Handlers for the public, gated catalog.
//!
//! Every read here uses [`AppState::public`], so a video whose publication
//! time is still in the future is invisible: it is not listed, not counted,
//! and a direct lookup by slug answers 404.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use vidcat_db::models::playlist::PlaylistDetail;
use vidcat_db::models::topic::TopicWithPlaylists;
use vidcat_db::models::video::VideoResponse;
use vidcat_db::repositories::{PlaylistRepo, TopicRepo, VideoRepo};

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(entity: &str, slug: &str) -> AppError {
    AppError::NotFound(format!("{entity} '{slug}' not found"))
}

/// GET /api/v1/videos?limit=&offset=
pub async fn list_videos(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.window();
    let now = state.now();
    let videos = VideoRepo::list(&state.pool, &state.public(), limit, offset).await?;
    let data: Vec<VideoResponse> = videos
        .into_iter()
        .map(|v| VideoResponse::new(v, now))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/series
///
/// Every playlist with the number of videos currently visible in it.
pub async fn list_series(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let playlists = PlaylistRepo::list_with_counts(&state.pool, &state.public()).await?;
    Ok(Json(DataResponse { data: playlists }))
}

/// GET /api/v1/series/{playlist_slug}
pub async fn show_series(
    State(state): State<AppState>,
    Path(playlist_slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let playlist = PlaylistRepo::find_by_slug(&state.pool, &playlist_slug)
        .await?
        .ok_or_else(|| not_found("Playlist", &playlist_slug))?;

    let now = state.now();
    let videos = VideoRepo::list_in_playlist(&state.pool, playlist.id, &state.public()).await?;
    Ok(Json(DataResponse {
        data: PlaylistDetail {
            playlist,
            videos: videos
                .into_iter()
                .map(|v| VideoResponse::new(v, now))
                .collect(),
        },
    }))
}

/// GET /api/v1/series/{playlist_slug}/{video_slug}
pub async fn show_video(
    State(state): State<AppState>,
    Path((playlist_slug, video_slug)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let playlist = PlaylistRepo::find_by_slug(&state.pool, &playlist_slug)
        .await?
        .ok_or_else(|| not_found("Playlist", &playlist_slug))?;

    let video = VideoRepo::find_by_slug(&state.pool, playlist.id, &video_slug, &state.public())
        .await?
        .ok_or_else(|| not_found("Video", &video_slug))?;
    Ok(Json(DataResponse {
        data: VideoResponse::new(video, state.now()),
    }))
}

/// GET /api/v1/topics
pub async fn list_topics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let topics = TopicRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: topics }))
}

/// GET /api/v1/topics/{slug}
pub async fn show_topic(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let topic = TopicRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| not_found("Topic", &slug))?;
    let playlists =
        PlaylistRepo::list_by_topic_with_counts(&state.pool, topic.id, &state.public()).await?;
    Ok(Json(DataResponse {
        data: TopicWithPlaylists { topic, playlists },
    }))
}
