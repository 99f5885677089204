//! Repository for the `topics` table.

use sqlx::{PgConnection, PgPool};
use vidcat_core::catalog::validate_topic;
use vidcat_core::slug::needs_regeneration;
use vidcat_core::topic_import::TopicSeed;
use vidcat_core::types::DbId;

use crate::models::topic::{CreateTopic, Topic, UpdateTopic};
use crate::repositories::slug_repo::{SlugRepo, SlugScope, SlugWrite};
use crate::DbError;

const COLUMNS: &str = "id, title, description, slug, color, thumbnail_ref, created_at, updated_at";

struct InsertTopic<'a> {
    title: &'a str,
    description: &'a str,
    color: Option<&'a str>,
    thumbnail_ref: Option<&'a str>,
}

impl SlugWrite for InsertTopic<'_> {
    type Output = Topic;

    async fn write(&self, conn: &mut PgConnection, slug: &str) -> Result<Topic, sqlx::Error> {
        let query = format!(
            "INSERT INTO topics (title, description, slug, color, thumbnail_ref)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(self.title)
            .bind(self.description)
            .bind(slug)
            .bind(self.color)
            .bind(self.thumbnail_ref)
            .fetch_one(&mut *conn)
            .await
    }
}

struct UpdateTopicRow<'a> {
    id: DbId,
    input: &'a UpdateTopic,
}

impl SlugWrite for UpdateTopicRow<'_> {
    type Output = Topic;

    async fn write(&self, conn: &mut PgConnection, slug: &str) -> Result<Topic, sqlx::Error> {
        let query = format!(
            "UPDATE topics SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                slug = $4,
                color = COALESCE($5, color),
                thumbnail_ref = COALESCE($6, thumbnail_ref),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(self.id)
            .bind(&self.input.title)
            .bind(&self.input.description)
            .bind(slug)
            .bind(&self.input.color)
            .bind(&self.input.thumbnail_ref)
            .fetch_one(&mut *conn)
            .await
    }
}

/// Provides CRUD operations for topics plus seed import.
pub struct TopicRepo;

impl TopicRepo {
    /// Insert a new topic with a globally unique slug derived from its title.
    pub async fn create(pool: &PgPool, input: &CreateTopic) -> Result<Topic, DbError> {
        validate_topic(Some(&input.title), Some(&input.description))?;

        let mut tx = pool.begin().await?;
        let writer = InsertTopic {
            title: &input.title,
            description: &input.description,
            color: input.color.as_deref(),
            thumbnail_ref: input.thumbnail_ref.as_deref(),
        };
        let topic =
            SlugRepo::write_with_slug(&mut tx, SlugScope::Topics, &input.title, None, &writer)
                .await?;
        tx.commit().await?;

        tracing::info!(topic_id = topic.id, slug = %topic.slug, "Topic created");
        Ok(topic)
    }

    /// Insert every seed in one transaction. Either all topics are created or
    /// none are.
    pub async fn import(pool: &PgPool, seeds: &[TopicSeed]) -> Result<Vec<Topic>, DbError> {
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let writer = InsertTopic {
                title: &seed.title,
                description: &seed.description,
                color: seed.color.as_deref(),
                thumbnail_ref: None,
            };
            let topic =
                SlugRepo::write_with_slug(&mut tx, SlugScope::Topics, &seed.title, None, &writer)
                    .await?;
            created.push(topic);
        }
        tx.commit().await?;

        tracing::info!(count = created.len(), "Topics imported");
        Ok(created)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM topics WHERE id = $1");
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM topics WHERE slug = $1");
        sqlx::query_as::<_, Topic>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all topics ordered by title.
    pub async fn list(pool: &PgPool) -> Result<Vec<Topic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM topics ORDER BY title ASC, id ASC");
        sqlx::query_as::<_, Topic>(&query).fetch_all(pool).await
    }

    /// Update a topic. Only non-`None` fields in `input` are applied; the slug
    /// is re-derived only when the title actually changes.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTopic,
    ) -> Result<Option<Topic>, DbError> {
        validate_topic(input.title.as_deref(), input.description.as_deref())?;

        let mut tx = pool.begin().await?;
        let query = format!("SELECT {COLUMNS} FROM topics WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let writer = UpdateTopicRow { id, input };
        let topic = match input.title.as_deref() {
            Some(title) if needs_regeneration(&current.title, Some(title)) => {
                SlugRepo::write_with_slug(&mut tx, SlugScope::Topics, title, Some(id), &writer)
                    .await?
            }
            _ => writer.write(&mut tx, &current.slug).await?,
        };
        tx.commit().await?;

        if topic.slug != current.slug {
            tracing::info!(topic_id = id, old = %current.slug, new = %topic.slug, "Topic slug regenerated");
        }
        Ok(Some(topic))
    }

    /// Delete a topic. Its playlists stay and lose their topic.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM topics WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
