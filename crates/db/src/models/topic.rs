//! Topic entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidcat_core::types::{DbId, Timestamp};

use crate::models::playlist::PlaylistWithCount;

/// A row from the `topics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Topic {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub color: Option<String>,
    pub thumbnail_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new topic. The slug is derived from the title.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTopic {
    pub title: String,
    pub description: String,
    pub color: Option<String>,
    pub thumbnail_ref: Option<String>,
}

/// DTO for updating a topic. A new title re-derives the slug.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTopic {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub thumbnail_ref: Option<String>,
}

/// A topic with its playlists and their video counts.
#[derive(Debug, Clone, Serialize)]
pub struct TopicWithPlaylists {
    #[serde(flatten)]
    pub topic: Topic,
    pub playlists: Vec<PlaylistWithCount>,
}
