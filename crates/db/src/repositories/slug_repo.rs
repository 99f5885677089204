//! Scoped slug allocation against the store.
//!
//! One parameterized check serves every entity type: a [`SlugScope`] names
//! the table, the optional scope column and the unique constraint that backs
//! it. Writers run through [`SlugRepo::write_with_slug`], which serializes
//! allocation per scope with a transaction-scoped advisory lock and retries
//! inside a savepoint if the constraint still fires.

use std::future::Future;

use sqlx::{Acquire, PgConnection};
use vidcat_core::slug::SlugAllocator;
use vidcat_core::types::DbId;

use crate::{is_unique_violation, DbError};

/// The set of rows within which a slug must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugScope {
    /// All topics.
    Topics,
    /// All playlists.
    Playlists,
    /// The videos of one playlist.
    PlaylistVideos(DbId),
}

impl SlugScope {
    pub fn table(self) -> &'static str {
        match self {
            Self::Topics => "topics",
            Self::Playlists => "playlists",
            Self::PlaylistVideos(_) => "videos",
        }
    }

    /// Name of the unique constraint that is the authoritative backstop.
    pub fn constraint(self) -> &'static str {
        match self {
            Self::Topics => "uq_topics_slug",
            Self::Playlists => "uq_playlists_slug",
            Self::PlaylistVideos(_) => "uq_videos_playlist_slug",
        }
    }

    fn lock_key(self) -> String {
        match self {
            Self::PlaylistVideos(playlist_id) => format!("slug:videos:{playlist_id}"),
            other => format!("slug:{}", other.table()),
        }
    }
}

/// Writes a row carrying a candidate slug.
///
/// Implemented by each repository's insert/update step so the allocation loop
/// exists once.
pub(crate) trait SlugWrite {
    type Output;

    fn write(
        &self,
        conn: &mut PgConnection,
        slug: &str,
    ) -> impl Future<Output = Result<Self::Output, sqlx::Error>> + Send;
}

/// Slug lookups and allocation.
pub struct SlugRepo;

impl SlugRepo {
    /// Serialize slug writers for `scope` until the enclosing transaction ends.
    pub async fn lock_scope(conn: &mut PgConnection, scope: SlugScope) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(scope.lock_key())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Slugs in `scope` equal to `base` or of the form `base-*`, ignoring the
    /// row `exclude_id` (the entity being updated).
    pub async fn taken(
        conn: &mut PgConnection,
        scope: SlugScope,
        base: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Vec<String>, sqlx::Error> {
        let pattern = format!("{base}-%");
        let table = scope.table();
        let rows: Vec<(String,)> = match scope {
            SlugScope::PlaylistVideos(playlist_id) => {
                let query = format!(
                    "SELECT slug FROM {table} \
                     WHERE playlist_id = $1 \
                       AND (slug = $2 OR slug LIKE $3) \
                       AND ($4::BIGINT IS NULL OR id <> $4)"
                );
                sqlx::query_as(&query)
                    .bind(playlist_id)
                    .bind(base)
                    .bind(&pattern)
                    .bind(exclude_id)
                    .fetch_all(&mut *conn)
                    .await?
            }
            SlugScope::Topics | SlugScope::Playlists => {
                let query = format!(
                    "SELECT slug FROM {table} \
                     WHERE (slug = $1 OR slug LIKE $2) \
                       AND ($3::BIGINT IS NULL OR id <> $3)"
                );
                sqlx::query_as(&query)
                    .bind(base)
                    .bind(&pattern)
                    .bind(exclude_id)
                    .fetch_all(&mut *conn)
                    .await?
            }
        };
        Ok(rows.into_iter().map(|(slug,)| slug).collect())
    }

    /// Lock the scope and build an allocator seeded with its taken slugs.
    pub async fn allocator(
        conn: &mut PgConnection,
        scope: SlugScope,
        title: &str,
        exclude_id: Option<DbId>,
    ) -> Result<SlugAllocator, DbError> {
        let base = vidcat_core::slug::normalize(title)?;
        Self::lock_scope(conn, scope).await?;
        let taken = Self::taken(conn, scope, &base, exclude_id).await?;
        Ok(SlugAllocator::new(base, taken))
    }

    /// Derive a slug for `title` in `scope` and run `writer` with it.
    ///
    /// A uniqueness violation on the scope's constraint rolls back to a
    /// savepoint and retries with the next free suffix. Exhausting the
    /// allocator's attempts is a consistency fault.
    pub(crate) async fn write_with_slug<W: SlugWrite>(
        conn: &mut PgConnection,
        scope: SlugScope,
        title: &str,
        exclude_id: Option<DbId>,
        writer: &W,
    ) -> Result<W::Output, DbError> {
        let mut slugs = Self::allocator(conn, scope, title, exclude_id).await?;

        loop {
            let slug = slugs.candidate();
            let mut savepoint = (&mut *conn).begin().await?;

            match writer.write(&mut savepoint, &slug).await {
                Ok(output) => {
                    savepoint.commit().await?;
                    return Ok(output);
                }
                Err(err) if is_unique_violation(&err, scope.constraint()) => {
                    savepoint.rollback().await?;
                    tracing::warn!(
                        table = scope.table(),
                        slug = %slug,
                        "Slug collided despite scope lock, retrying with next suffix"
                    );
                    slugs.reject(slug).inspect_err(|e| {
                        tracing::error!(
                            table = scope.table(),
                            base = slugs.base(),
                            error = %e,
                            "Slug allocation exhausted"
                        );
                    })?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use sqlx::PgPool;
    use vidcat_core::error::CoreError;
    use vidcat_core::slug::MAX_SLUG_ATTEMPTS;

    use super::*;

    #[test]
    fn scopes_map_to_tables_and_constraints() {
        assert_eq!(SlugScope::Topics.table(), "topics");
        assert_eq!(SlugScope::Playlists.constraint(), "uq_playlists_slug");
        assert_eq!(SlugScope::PlaylistVideos(3).table(), "videos");
        assert_eq!(
            SlugScope::PlaylistVideos(3).constraint(),
            "uq_videos_playlist_slug"
        );
    }

    #[test]
    fn video_scopes_lock_per_playlist() {
        assert_ne!(
            SlugScope::PlaylistVideos(1).lock_key(),
            SlugScope::PlaylistVideos(2).lock_key()
        );
        assert_eq!(SlugScope::Topics.lock_key(), "slug:topics");
    }

    // -----------------------------------------------------------------------
    // write_with_slug against the unique constraint
    // -----------------------------------------------------------------------

    async fn insert_topic(
        conn: &mut PgConnection,
        title: &str,
        slug: &str,
    ) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO topics (title, description, slug) VALUES ($1, '', $2) RETURNING id",
        )
        .bind(title)
        .bind(slug)
        .fetch_one(&mut *conn)
        .await?;
        Ok(id)
    }

    /// Writes a topic, but for its first `collisions` calls a rival row grabs
    /// the candidate slug first, as a writer that bypassed the scope lock
    /// would.
    struct ContestedTopic {
        collisions: usize,
        calls: AtomicUsize,
    }

    impl ContestedTopic {
        fn new(collisions: usize) -> Self {
            Self {
                collisions,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SlugWrite for ContestedTopic {
        type Output = (DbId, String);

        async fn write(
            &self,
            conn: &mut PgConnection,
            slug: &str,
        ) -> Result<(DbId, String), sqlx::Error> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.collisions {
                insert_topic(conn, "Rival", slug).await?;
            }
            let id = insert_topic(conn, "Sample", slug).await?;
            Ok((id, slug.to_string()))
        }
    }

    #[sqlx::test(migrations = "../../db/migrations")]
    async fn collision_rolls_back_savepoint_and_takes_next_suffix(pool: PgPool) {
        let writer = ContestedTopic::new(1);
        let mut tx = pool.begin().await.unwrap();
        let (id, slug) =
            SlugRepo::write_with_slug(&mut tx, SlugScope::Topics, "Sample", None, &writer)
                .await
                .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(slug, "sample-2");
        assert_eq!(writer.calls.load(Ordering::SeqCst), 2);

        let rows: Vec<(DbId, String, String)> =
            sqlx::query_as("SELECT id, title, slug FROM topics ORDER BY id")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(rows, vec![(id, "Sample".to_string(), "sample-2".to_string())]);
    }

    #[sqlx::test(migrations = "../../db/migrations")]
    async fn endless_collisions_are_a_consistency_fault(pool: PgPool) {
        let writer = ContestedTopic::new(usize::MAX);
        let mut tx = pool.begin().await.unwrap();
        let result =
            SlugRepo::write_with_slug(&mut tx, SlugScope::Topics, "Sample", None, &writer).await;
        tx.rollback().await.unwrap();

        assert_matches!(result, Err(DbError::Core(CoreError::Consistency(_))));
        assert_eq!(writer.calls.load(Ordering::SeqCst), MAX_SLUG_ATTEMPTS);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM topics")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
