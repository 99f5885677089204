//! Playlist ordering against the store.
//!
//! Every method takes `&mut PgConnection` and expects to run inside the
//! caller's transaction, after [`PositionRepo::lock_playlist`] has taken the
//! playlist row lock. `videos.position` is backed by a deferred unique
//! constraint, so intermediate states inside the transaction may repeat a
//! position as long as the committed ordering does not.

use sqlx::PgConnection;
use vidcat_core::error::CoreError;
use vidcat_core::ordering::{self, MoveDirection, Slot};
use vidcat_core::types::{DbId, Position};

use crate::DbError;

/// Position Manager operations.
pub struct PositionRepo;

impl PositionRepo {
    /// Lock a playlist row for the rest of the transaction.
    ///
    /// Returns `false` if the playlist does not exist.
    pub async fn lock_playlist(
        conn: &mut PgConnection,
        playlist_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as("SELECT id FROM playlists WHERE id = $1 FOR UPDATE")
            .bind(playlist_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    /// Highest position in the playlist, `None` when empty.
    pub async fn max_position(
        conn: &mut PgConnection,
        playlist_id: DbId,
    ) -> Result<Option<Position>, sqlx::Error> {
        let (max,): (Option<Position>,) =
            sqlx::query_as("SELECT MAX(position) FROM videos WHERE playlist_id = $1")
                .bind(playlist_id)
                .fetch_one(&mut *conn)
                .await?;
        Ok(max)
    }

    /// Lock the playlist and return the position a new video must take.
    ///
    /// A missing playlist is a validation error: the caller asked to attach a
    /// video to something that does not exist.
    pub async fn insert_at_end(
        conn: &mut PgConnection,
        playlist_id: DbId,
    ) -> Result<Position, DbError> {
        if !Self::lock_playlist(conn, playlist_id).await? {
            return Err(CoreError::Validation(format!("Playlist {playlist_id} does not exist")).into());
        }
        let max = Self::max_position(conn, playlist_id).await?;
        Ok(ordering::next_position(max))
    }

    /// Number of videos in the playlist holding `position`.
    async fn holders(
        conn: &mut PgConnection,
        playlist_id: DbId,
        position: Position,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM videos WHERE playlist_id = $1 AND position = $2",
        )
        .bind(playlist_id)
        .bind(position)
        .fetch_one(&mut *conn)
        .await?;
        Ok(count)
    }

    /// The immediate neighbour of `slot` in `direction`, if any.
    pub async fn neighbour(
        conn: &mut PgConnection,
        playlist_id: DbId,
        slot: Slot,
        direction: MoveDirection,
    ) -> Result<Option<Slot>, DbError> {
        ordering::ensure_unique_position(
            slot.position,
            Self::holders(conn, playlist_id, slot.position).await?,
        )?;

        let (cmp, order) = match direction {
            MoveDirection::Up => ("<", "DESC"),
            MoveDirection::Down => (">", "ASC"),
        };
        let query = format!(
            "SELECT id, position FROM videos \
             WHERE playlist_id = $1 AND position {cmp} $2 \
             ORDER BY position {order} \
             LIMIT 2"
        );
        let rows: Vec<(DbId, Position)> = sqlx::query_as(&query)
            .bind(playlist_id)
            .bind(slot.position)
            .fetch_all(&mut *conn)
            .await?;

        let candidates: Vec<Slot> = rows
            .into_iter()
            .map(|(video_id, position)| Slot { video_id, position })
            .collect();
        Ok(ordering::pick_neighbour(&candidates)?)
    }

    async fn set_position(
        conn: &mut PgConnection,
        slot: Slot,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE videos SET position = $2, updated_at = NOW() WHERE id = $1")
            .bind(slot.video_id)
            .bind(slot.position)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Swap `slot` with its neighbour in `direction`.
    ///
    /// Returns `false` without touching anything when the video is already
    /// at that end of the playlist.
    pub async fn shift(
        conn: &mut PgConnection,
        playlist_id: DbId,
        slot: Slot,
        direction: MoveDirection,
    ) -> Result<bool, DbError> {
        let Some(neighbour) = Self::neighbour(conn, playlist_id, slot, direction).await? else {
            return Ok(false);
        };
        for assignment in ordering::swap(slot, neighbour) {
            Self::set_position(conn, assignment).await?;
        }
        Ok(true)
    }

    /// Delete the video at `slot` and close the gap it leaves.
    pub async fn remove(
        conn: &mut PgConnection,
        playlist_id: DbId,
        slot: Slot,
    ) -> Result<(), DbError> {
        let deleted = sqlx::query("DELETE FROM videos WHERE id = $1 AND playlist_id = $2")
            .bind(slot.video_id)
            .bind(playlist_id)
            .execute(&mut *conn)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(CoreError::NotFound {
                entity: "Video",
                id: slot.video_id,
            }
            .into());
        }

        sqlx::query(
            "UPDATE videos SET position = position - 1, updated_at = NOW() \
             WHERE playlist_id = $1 AND position > $2",
        )
        .bind(playlist_id)
        .bind(slot.position)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Positions in the playlist, ascending.
    pub async fn positions(
        conn: &mut PgConnection,
        playlist_id: DbId,
    ) -> Result<Vec<Position>, sqlx::Error> {
        let rows: Vec<(Position,)> =
            sqlx::query_as("SELECT position FROM videos WHERE playlist_id = $1 ORDER BY position")
                .bind(playlist_id)
                .fetch_all(&mut *conn)
                .await?;
        Ok(rows.into_iter().map(|(position,)| position).collect())
    }

    /// Fail unless the playlist's positions are exactly `1..=n`.
    pub async fn verify(conn: &mut PgConnection, playlist_id: DbId) -> Result<(), DbError> {
        let positions = Self::positions(conn, playlist_id).await?;
        ordering::check_contiguous(&positions).map_err(|e| {
            tracing::error!(playlist_id, error = %e, "Playlist ordering is inconsistent");
            DbError::from(e)
        })
    }
}
