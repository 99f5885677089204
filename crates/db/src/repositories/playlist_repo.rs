//! Repository for the `playlists` table.

use sqlx::{PgConnection, PgPool};
use vidcat_core::catalog::validate_playlist;
use vidcat_core::error::CoreError;
use vidcat_core::slug::needs_regeneration;
use vidcat_core::types::DbId;
use vidcat_core::visibility::Audience;

use crate::gate::published_by;
use crate::models::playlist::{CreatePlaylist, Playlist, PlaylistWithCount, UpdatePlaylist};
use crate::repositories::position_repo::PositionRepo;
use crate::repositories::slug_repo::{SlugRepo, SlugScope, SlugWrite};
use crate::DbError;

const COLUMNS: &str = "id, title, description, external_media_ref, slug, topic_id, \
                       card_ref, thumbnail_ref, created_at, updated_at";

/// [`COLUMNS`] qualified with the `p` alias, for joins.
const P_COLUMNS: &str = "p.id, p.title, p.description, p.external_media_ref, p.slug, \
                         p.topic_id, p.card_ref, p.thumbnail_ref, p.created_at, p.updated_at";

struct InsertPlaylist<'a> {
    input: &'a CreatePlaylist,
}

impl SlugWrite for InsertPlaylist<'_> {
    type Output = Playlist;

    async fn write(&self, conn: &mut PgConnection, slug: &str) -> Result<Playlist, sqlx::Error> {
        let query = format!(
            "INSERT INTO playlists
                (title, description, external_media_ref, slug, topic_id, card_ref, thumbnail_ref)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Playlist>(&query)
            .bind(&self.input.title)
            .bind(&self.input.description)
            .bind(&self.input.external_media_ref)
            .bind(slug)
            .bind(self.input.topic_id)
            .bind(&self.input.card_ref)
            .bind(&self.input.thumbnail_ref)
            .fetch_one(&mut *conn)
            .await
    }
}

struct UpdatePlaylistRow<'a> {
    id: DbId,
    input: &'a UpdatePlaylist,
}

impl SlugWrite for UpdatePlaylistRow<'_> {
    type Output = Playlist;

    async fn write(&self, conn: &mut PgConnection, slug: &str) -> Result<Playlist, sqlx::Error> {
        let query = format!(
            "UPDATE playlists SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                external_media_ref = COALESCE($4, external_media_ref),
                slug = $5,
                topic_id = COALESCE($6, topic_id),
                card_ref = COALESCE($7, card_ref),
                thumbnail_ref = COALESCE($8, thumbnail_ref),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Playlist>(&query)
            .bind(self.id)
            .bind(&self.input.title)
            .bind(&self.input.description)
            .bind(&self.input.external_media_ref)
            .bind(slug)
            .bind(self.input.topic_id)
            .bind(&self.input.card_ref)
            .bind(&self.input.thumbnail_ref)
            .fetch_one(&mut *conn)
            .await
    }
}

/// Fail with a validation error if `topic_id` names no topic.
async fn ensure_topic(conn: &mut PgConnection, topic_id: Option<DbId>) -> Result<(), DbError> {
    let Some(topic_id) = topic_id else {
        return Ok(());
    };
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM topics WHERE id = $1)")
        .bind(topic_id)
        .fetch_one(&mut *conn)
        .await?;
    if !exists {
        return Err(CoreError::Validation(format!("Topic {topic_id} does not exist")).into());
    }
    Ok(())
}

/// Provides CRUD operations for playlists and their gated video counts.
pub struct PlaylistRepo;

impl PlaylistRepo {
    /// Insert a new, empty playlist with a globally unique slug.
    pub async fn create(pool: &PgPool, input: &CreatePlaylist) -> Result<Playlist, DbError> {
        validate_playlist(
            Some(&input.title),
            Some(&input.description),
            Some(&input.external_media_ref),
        )?;

        let mut tx = pool.begin().await?;
        ensure_topic(&mut tx, input.topic_id).await?;
        let playlist = SlugRepo::write_with_slug(
            &mut tx,
            SlugScope::Playlists,
            &input.title,
            None,
            &InsertPlaylist { input },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(playlist_id = playlist.id, slug = %playlist.slug, "Playlist created");
        Ok(playlist)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Playlist>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM playlists WHERE id = $1");
        sqlx::query_as::<_, Playlist>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Playlist>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM playlists WHERE slug = $1");
        sqlx::query_as::<_, Playlist>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List playlists, most recently updated first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Playlist>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM playlists
             ORDER BY updated_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Playlist>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every playlist with the number of videos `audience` can see, by title.
    pub async fn list_with_counts(
        pool: &PgPool,
        audience: &Audience,
    ) -> Result<Vec<PlaylistWithCount>, sqlx::Error> {
        let gate = published_by("v.published_at", 1);
        let query = format!(
            "SELECT {P_COLUMNS}, COUNT(v.id) AS video_count
             FROM playlists p
             LEFT JOIN videos v ON v.playlist_id = p.id AND {gate}
             GROUP BY p.id
             ORDER BY p.title ASC, p.id ASC"
        );
        sqlx::query_as::<_, PlaylistWithCount>(&query)
            .bind(audience.cutoff())
            .fetch_all(pool)
            .await
    }

    /// Playlists of one topic with the number of videos `audience` can see.
    pub async fn list_by_topic_with_counts(
        pool: &PgPool,
        topic_id: DbId,
        audience: &Audience,
    ) -> Result<Vec<PlaylistWithCount>, sqlx::Error> {
        let gate = published_by("v.published_at", 2);
        let query = format!(
            "SELECT {P_COLUMNS}, COUNT(v.id) AS video_count
             FROM playlists p
             LEFT JOIN videos v ON v.playlist_id = p.id AND {gate}
             WHERE p.topic_id = $1
             GROUP BY p.id
             ORDER BY p.title ASC, p.id ASC"
        );
        sqlx::query_as::<_, PlaylistWithCount>(&query)
            .bind(topic_id)
            .bind(audience.cutoff())
            .fetch_all(pool)
            .await
    }

    /// Update a playlist. Only non-`None` fields in `input` are applied; the
    /// slug is re-derived only when the title actually changes.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlaylist,
    ) -> Result<Option<Playlist>, DbError> {
        validate_playlist(
            input.title.as_deref(),
            input.description.as_deref(),
            input.external_media_ref.as_deref(),
        )?;

        let mut tx = pool.begin().await?;
        let query = format!("SELECT {COLUMNS} FROM playlists WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Playlist>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        ensure_topic(&mut tx, input.topic_id).await?;

        let writer = UpdatePlaylistRow { id, input };
        let playlist = match input.title.as_deref() {
            Some(title) if needs_regeneration(&current.title, Some(title)) => {
                SlugRepo::write_with_slug(&mut tx, SlugScope::Playlists, title, Some(id), &writer)
                    .await?
            }
            _ => writer.write(&mut tx, &current.slug).await?,
        };
        tx.commit().await?;

        if playlist.slug != current.slug {
            tracing::info!(playlist_id = id, old = %current.slug, new = %playlist.slug, "Playlist slug regenerated");
        }
        Ok(Some(playlist))
    }

    /// Destroy an empty playlist.
    ///
    /// A playlist that still holds videos is not destroyed: the caller must
    /// remove its videos first. Returns `false` if no row with `id` exists.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;
        if !PositionRepo::lock_playlist(&mut tx, id).await? {
            return Ok(false);
        }

        let (videos,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM videos WHERE playlist_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if videos > 0 {
            return Err(CoreError::Conflict(format!(
                "Playlist {id} still contains {videos} video(s); remove them first"
            ))
            .into());
        }

        sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(playlist_id = id, "Playlist destroyed");
        Ok(true)
    }
}
