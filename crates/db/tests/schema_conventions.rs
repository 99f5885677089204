//! Schema convention checks run against the migrated database.

use sqlx::PgPool;

/// All `id` columns must be bigint.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 3, "expected topics, playlists and videos");
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Every table must carry timestamptz `created_at` and `updated_at`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_tables_have_timestamps(pool: PgPool) {
    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT c.table_name, c.column_name, c.data_type
         FROM information_schema.columns c
         JOIN information_schema.tables t
             ON t.table_name = c.table_name AND t.table_schema = c.table_schema
         WHERE c.table_schema = 'public'
           AND t.table_type = 'BASE TABLE'
           AND c.table_name != '_sqlx_migrations'
           AND c.column_name IN ('created_at', 'updated_at')
         ORDER BY c.table_name, c.column_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 6, "each of the three tables needs both columns");
    for (table, column, data_type) in &rows {
        assert_eq!(
            data_type, "timestamp with time zone",
            "Table {table}.{column} should be timestamptz"
        );
    }
}

/// TEXT only; no character varying columns.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_no_varchar_columns(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, column_name
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND data_type = 'character varying'
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(rows.is_empty(), "Found VARCHAR columns: {rows:?}");
}

/// Every foreign key column must be indexed and declare its referential rules.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_keys_are_indexed_with_explicit_rules(pool: PgPool) {
    let fks: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT tc.table_name, kcu.column_name, rc.delete_rule, rc.update_rule
         FROM information_schema.table_constraints tc
         JOIN information_schema.key_column_usage kcu
             ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
         JOIN information_schema.referential_constraints rc
             ON rc.constraint_name = tc.constraint_name
             AND rc.constraint_schema = tc.table_schema
         WHERE tc.constraint_type = 'FOREIGN KEY'
           AND tc.table_schema = 'public'
         ORDER BY tc.table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(fks.len(), 2, "playlists.topic_id and videos.playlist_id");
    for (table, column, delete_rule, update_rule) in &fks {
        let (indexed,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM pg_indexes
                WHERE schemaname = 'public' AND tablename = $1 AND indexdef LIKE $2
            )",
        )
        .bind(table)
        .bind(format!("%({column})%"))
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(indexed, "FK column {table}.{column} has no index");
        assert_ne!(delete_rule, "NO ACTION", "{table}.{column} needs ON DELETE");
        assert_ne!(update_rule, "NO ACTION", "{table}.{column} needs ON UPDATE");
    }
}

/// The position constraint must be deferred so swaps can happen in one
/// transaction.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_position_uniqueness_is_deferred(pool: PgPool) {
    let (deferrable, deferred): (bool, bool) = sqlx::query_as(
        "SELECT condeferrable, condeferred
         FROM pg_constraint
         WHERE conname = 'uq_videos_playlist_position'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    assert!(deferrable && deferred);
}
