//! Video entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidcat_core::error::CoreError;
use vidcat_core::ordering::MoveDirection;
use vidcat_core::types::{DbId, Position, Timestamp};
use vidcat_core::video::{format_natural_duration, VideoInput};
use vidcat_core::visibility::{Publishable, Visibility};

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub external_media_id: String,
    pub duration_secs: i32,
    pub slug: String,
    pub playlist_id: DbId,
    pub position: Position,
    pub published_at: Timestamp,
    pub unfeatured: bool,
    pub private: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Publishable for Video {
    fn published_at(&self) -> Timestamp {
        self.published_at
    }
}

/// DTO for creating a video at the end of a playlist.
///
/// Required fields are `Option` so that a missing value is reported as a
/// validation error rather than a deserialization failure. Duration may be
/// given as seconds or as `H:MM:SS`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVideo {
    pub playlist_id: Option<DbId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub external_media_id: Option<String>,
    pub duration_secs: Option<i32>,
    pub natural_duration: Option<String>,
    pub published_at: Option<Timestamp>,
    pub unfeatured: Option<bool>,
    pub private: Option<bool>,
}

impl CreateVideo {
    pub fn as_input(&self) -> VideoInput<'_> {
        VideoInput {
            title: self.title.as_deref(),
            description: self.description.as_deref(),
            external_media_id: self.external_media_id.as_deref(),
            duration_secs: self.duration_secs,
            natural_duration: self.natural_duration.as_deref(),
            published_at: self.published_at,
        }
    }
}

/// DTO for updating a video. The playlist cannot change; a new title
/// re-derives the slug within the same playlist.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub external_media_id: Option<String>,
    pub duration_secs: Option<i32>,
    pub natural_duration: Option<String>,
    pub published_at: Option<Timestamp>,
    pub unfeatured: Option<bool>,
    pub private: Option<bool>,
}

impl UpdateVideo {
    pub fn as_input(&self) -> VideoInput<'_> {
        VideoInput {
            title: self.title.as_deref(),
            description: self.description.as_deref(),
            external_media_id: self.external_media_id.as_deref(),
            duration_secs: self.duration_secs,
            natural_duration: self.natural_duration.as_deref(),
            published_at: self.published_at,
        }
    }
}

/// Body of a relative move request: `{"direction": "up" | "down"}`.
///
/// Kept as text so an unknown or missing direction is reported as a
/// validation error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoveVideo {
    pub direction: Option<String>,
}

impl MoveVideo {
    pub fn direction(&self) -> Result<MoveDirection, CoreError> {
        self.direction
            .as_deref()
            .ok_or_else(|| CoreError::Validation("Direction is required".into()))?
            .parse()
    }
}

/// A video as returned to callers, with derived fields. Visibility is
/// computed from `published_at` at response time, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct VideoResponse {
    #[serde(flatten)]
    pub video: Video,
    pub natural_duration: String,
    pub visibility: Visibility,
}

impl VideoResponse {
    pub fn new(video: Video, now: Timestamp) -> Self {
        let visibility = video.visibility(now);
        Self {
            natural_duration: format_natural_duration(video.duration_secs),
            visibility,
            video,
        }
    }
}
