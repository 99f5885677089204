//! Repository for the `videos` table.
//!
//! Writes go through the Position Manager and the scoped slug allocator
//! inside one transaction per operation. Reads take an [`Audience`] and
//! filter through the publication gate; admin reads pass [`Audience::Admin`].

use sqlx::{PgConnection, PgPool};
use vidcat_core::error::CoreError;
use vidcat_core::ordering::{MoveDirection, Slot};
use vidcat_core::slug::needs_regeneration;
use vidcat_core::types::{DbId, Position};
use vidcat_core::video::{validate_new, validate_patch, ValidatedNewVideo};
use vidcat_core::visibility::Audience;

use crate::gate::published_by;
use crate::models::video::{CreateVideo, UpdateVideo, Video};
use crate::repositories::position_repo::PositionRepo;
use crate::repositories::slug_repo::{SlugRepo, SlugScope, SlugWrite};
use crate::DbError;

const COLUMNS: &str = "id, title, description, external_media_id, duration_secs, slug, \
                       playlist_id, position, published_at, unfeatured, private, \
                       created_at, updated_at";

struct InsertVideo<'a> {
    playlist_id: DbId,
    position: Position,
    input: &'a CreateVideo,
    validated: ValidatedNewVideo,
}

impl SlugWrite for InsertVideo<'_> {
    type Output = Video;

    async fn write(&self, conn: &mut PgConnection, slug: &str) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos
                (title, description, external_media_id, duration_secs, slug,
                 playlist_id, position, published_at, unfeatured, private)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, false), COALESCE($10, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(&self.input.title)
            .bind(&self.input.description)
            .bind(&self.input.external_media_id)
            .bind(self.validated.duration_secs)
            .bind(slug)
            .bind(self.playlist_id)
            .bind(self.position)
            .bind(self.validated.published_at)
            .bind(self.input.unfeatured)
            .bind(self.input.private)
            .fetch_one(&mut *conn)
            .await
    }
}

struct UpdateVideoRow<'a> {
    id: DbId,
    input: &'a UpdateVideo,
    duration_secs: Option<i32>,
}

impl SlugWrite for UpdateVideoRow<'_> {
    type Output = Video;

    async fn write(&self, conn: &mut PgConnection, slug: &str) -> Result<Video, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                external_media_id = COALESCE($4, external_media_id),
                duration_secs = COALESCE($5, duration_secs),
                slug = $6,
                published_at = COALESCE($7, published_at),
                unfeatured = COALESCE($8, unfeatured),
                private = COALESCE($9, private),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(self.id)
            .bind(&self.input.title)
            .bind(&self.input.description)
            .bind(&self.input.external_media_id)
            .bind(self.duration_secs)
            .bind(slug)
            .bind(self.input.published_at)
            .bind(self.input.unfeatured)
            .bind(self.input.private)
            .fetch_one(&mut *conn)
            .await
    }
}

/// Lock and load a video of `playlist_id`. The playlist lock must already be
/// held.
async fn lock_video(
    conn: &mut PgConnection,
    playlist_id: DbId,
    id: DbId,
) -> Result<Option<Video>, sqlx::Error> {
    let query =
        format!("SELECT {COLUMNS} FROM videos WHERE id = $1 AND playlist_id = $2 FOR UPDATE");
    sqlx::query_as::<_, Video>(&query)
        .bind(id)
        .bind(playlist_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Lock the playlist, then the video, or report which one is missing.
async fn lock_playlist_video(
    conn: &mut PgConnection,
    playlist_id: DbId,
    id: DbId,
) -> Result<Video, DbError> {
    if !PositionRepo::lock_playlist(conn, playlist_id).await? {
        return Err(CoreError::NotFound {
            entity: "Playlist",
            id: playlist_id,
        }
        .into());
    }
    lock_video(conn, playlist_id, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Video", id }.into())
}

/// Provides video CRUD, ordering and gated reads.
pub struct VideoRepo;

impl VideoRepo {
    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Validate and append a new video to the end of its playlist.
    ///
    /// Position and slug are assigned under the playlist lock, so concurrent
    /// creates into one playlist serialize.
    pub async fn create(pool: &PgPool, input: &CreateVideo) -> Result<Video, DbError> {
        let validated = validate_new(&input.as_input())?;
        let playlist_id = input
            .playlist_id
            .ok_or_else(|| CoreError::Validation("Playlist is required".into()))?;
        let title = input.title.as_deref().unwrap_or_default();

        let mut tx = pool.begin().await?;
        let position = PositionRepo::insert_at_end(&mut tx, playlist_id).await?;
        let writer = InsertVideo {
            playlist_id,
            position,
            input,
            validated,
        };
        let video = SlugRepo::write_with_slug(
            &mut tx,
            SlugScope::PlaylistVideos(playlist_id),
            title,
            None,
            &writer,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            video_id = video.id,
            playlist_id,
            position = video.position,
            slug = %video.slug,
            "Video created"
        );
        Ok(video)
    }

    /// Update a video in place. It never changes playlist or position; a
    /// changed title re-derives its slug within the same playlist.
    ///
    /// Returns `None` if the playlist or the video does not exist.
    pub async fn update(
        pool: &PgPool,
        playlist_id: DbId,
        id: DbId,
        input: &UpdateVideo,
    ) -> Result<Option<Video>, DbError> {
        let duration_secs = validate_patch(&input.as_input())?;

        let mut tx = pool.begin().await?;
        if !PositionRepo::lock_playlist(&mut tx, playlist_id).await? {
            return Ok(None);
        }
        let Some(current) = lock_video(&mut tx, playlist_id, id).await? else {
            return Ok(None);
        };

        let writer = UpdateVideoRow {
            id,
            input,
            duration_secs,
        };
        let video = match input.title.as_deref() {
            Some(title) if needs_regeneration(&current.title, Some(title)) => {
                SlugRepo::write_with_slug(
                    &mut tx,
                    SlugScope::PlaylistVideos(playlist_id),
                    title,
                    Some(id),
                    &writer,
                )
                .await?
            }
            _ => writer.write(&mut tx, &current.slug).await?,
        };
        tx.commit().await?;

        tracing::info!(video_id = id, playlist_id, slug = %video.slug, "Video updated");
        Ok(Some(video))
    }

    /// Swap a video with its neighbour in `direction`.
    ///
    /// Moving the first video up or the last video down changes nothing and
    /// is not an error. Returns the video as it stands afterwards.
    pub async fn move_video(
        pool: &PgPool,
        playlist_id: DbId,
        id: DbId,
        direction: MoveDirection,
    ) -> Result<Video, DbError> {
        let mut tx = pool.begin().await?;
        let video = lock_playlist_video(&mut tx, playlist_id, id).await?;
        let slot = Slot {
            video_id: video.id,
            position: video.position,
        };

        let moved = PositionRepo::shift(&mut tx, playlist_id, slot, direction).await?;
        if !moved {
            tracing::debug!(video_id = id, playlist_id, %direction, "Video already at edge");
            return Ok(video);
        }
        PositionRepo::verify(&mut tx, playlist_id).await?;
        let video = lock_video(&mut tx, playlist_id, id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Video", id })?;
        tx.commit().await?;

        tracing::info!(
            video_id = id,
            playlist_id,
            %direction,
            position = video.position,
            "Video moved"
        );
        Ok(video)
    }

    pub async fn move_up(pool: &PgPool, playlist_id: DbId, id: DbId) -> Result<Video, DbError> {
        Self::move_video(pool, playlist_id, id, MoveDirection::Up).await
    }

    pub async fn move_down(pool: &PgPool, playlist_id: DbId, id: DbId) -> Result<Video, DbError> {
        Self::move_video(pool, playlist_id, id, MoveDirection::Down).await
    }

    /// Remove a video and close the gap in its playlist.
    pub async fn delete(pool: &PgPool, playlist_id: DbId, id: DbId) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        let video = lock_playlist_video(&mut tx, playlist_id, id).await?;
        let slot = Slot {
            video_id: video.id,
            position: video.position,
        };

        PositionRepo::remove(&mut tx, playlist_id, slot).await?;
        PositionRepo::verify(&mut tx, playlist_id).await?;
        tx.commit().await?;

        tracing::info!(video_id = id, playlist_id, position = slot.position, "Video removed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a video by id, only if it belongs to `playlist_id`.
    pub async fn find_in_playlist(
        pool: &PgPool,
        playlist_id: DbId,
        id: DbId,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1 AND playlist_id = $2");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(playlist_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a video by its slug within a playlist. A scheduled video is
    /// absent for the public audience.
    pub async fn find_by_slug(
        pool: &PgPool,
        playlist_id: DbId,
        slug: &str,
        audience: &Audience,
    ) -> Result<Option<Video>, sqlx::Error> {
        let gate = published_by("published_at", 3);
        let query = format!(
            "SELECT {COLUMNS} FROM videos
             WHERE playlist_id = $1 AND slug = $2 AND {gate}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(playlist_id)
            .bind(slug)
            .bind(audience.cutoff())
            .fetch_optional(pool)
            .await
    }

    /// Videos of a playlist in position order.
    pub async fn list_in_playlist(
        pool: &PgPool,
        playlist_id: DbId,
        audience: &Audience,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let gate = published_by("published_at", 2);
        let query = format!(
            "SELECT {COLUMNS} FROM videos
             WHERE playlist_id = $1 AND {gate}
             ORDER BY position ASC"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(playlist_id)
            .bind(audience.cutoff())
            .fetch_all(pool)
            .await
    }

    /// Videos across all playlists, latest publication first.
    pub async fn list(
        pool: &PgPool,
        audience: &Audience,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let gate = published_by("published_at", 1);
        let query = format!(
            "SELECT {COLUMNS} FROM videos
             WHERE {gate}
             ORDER BY published_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(audience.cutoff())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Number of videos in a playlist that `audience` can see.
    pub async fn count_in_playlist(
        pool: &PgPool,
        playlist_id: DbId,
        audience: &Audience,
    ) -> Result<i64, sqlx::Error> {
        let gate = published_by("published_at", 2);
        let query = format!("SELECT COUNT(*) FROM videos WHERE playlist_id = $1 AND {gate}");
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(playlist_id)
            .bind(audience.cutoff())
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
