//! Playlist entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidcat_core::types::{DbId, Timestamp};

use crate::models::video::VideoResponse;

/// A row from the `playlists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Playlist {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub external_media_ref: String,
    pub slug: String,
    pub topic_id: Option<DbId>,
    pub card_ref: Option<String>,
    pub thumbnail_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a playlist. Playlists start empty.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylist {
    pub title: String,
    pub description: String,
    pub external_media_ref: String,
    pub topic_id: Option<DbId>,
    pub card_ref: Option<String>,
    pub thumbnail_ref: Option<String>,
}

/// DTO for updating a playlist. A new title re-derives the slug.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlaylist {
    pub title: Option<String>,
    pub description: Option<String>,
    pub external_media_ref: Option<String>,
    pub topic_id: Option<DbId>,
    pub card_ref: Option<String>,
    pub thumbnail_ref: Option<String>,
}

/// A playlist with the number of videos its reader can see.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaylistWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub playlist: Playlist,
    pub video_count: i64,
}

/// A playlist with its videos in position order.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub videos: Vec<VideoResponse>,
}
