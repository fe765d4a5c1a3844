pub mod models;
pub mod operations;
pub mod widgets;

use anyhow::Result;
use log::{debug, info};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

/// Open (creating if missing) the sqlite database at `path` and bring its
/// schema up to date. Accepts a bare path or a `sqlite://` URL.
pub async fn connect(path: &str) -> Result<SqlitePool> {
    let path = path.trim_start_matches("sqlite://");
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    init_database(&pool).await?;
    Ok(pool)
}

/// Delete all rows from every table. The demo seeder uses this for
/// `--reset`; nothing in the engine itself writes to the log store.
pub async fn clear_all_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM dashboard_widgets")
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM set_records").execute(pool).await?;
    sqlx::query("DELETE FROM logged_exercises")
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM workout_sessions")
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM exercise_muscle_groups")
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM exercises").execute(pool).await?;
    sqlx::query("DELETE FROM muscle_groups")
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM users").execute(pool).await?;
    Ok(())
}

struct Migration {
    name: &'static str,
    up_sql: &'static str,
}

const MIGRATION_2026_08_06_090000_0000_SETUP_TABLES: &str =
    include_str!("../../../migrations/2026-08-06-090000-0000_setup_tables/up.sql");

const MIGRATIONS: &[Migration] = &[Migration {
    name: "2026-08-06-090000-0000_setup_tables",
    up_sql: MIGRATION_2026_08_06_090000_0000_SETUP_TABLES,
}];

async fn init_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER NOT NULL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn is_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<bool> {
    let result =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _migrations WHERE name = ?1")
            .bind(migration_name)
            .fetch_one(pool)
            .await?;
    Ok(result > 0)
}

async fn mark_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<()> {
    sqlx::query("INSERT INTO _migrations (name) VALUES (?1)")
        .bind(migration_name)
        .execute(pool)
        .await?;
    Ok(())
}

fn parse_sql_statements(sql: &str) -> Vec<String> {
    sql.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    init_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        if is_migration_applied(pool, migration.name).await? {
            debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        info!("Applying migration: {}", migration.name);
        let statements = parse_sql_statements(migration.up_sql);

        for statement in statements {
            if !statement.trim().is_empty() {
                sqlx::query(&statement).execute(pool).await.map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to execute migration statement in {}: {} - Error: {}",
                        migration.name,
                        statement,
                        e
                    )
                })?;
            }
        }

        mark_migration_applied(pool, migration.name).await?;
        info!("Migration {} applied successfully", migration.name);
    }

    Ok(())
}
