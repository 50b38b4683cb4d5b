// file: src/database/mod.rs

use anyhow::{Context, Result};
use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePool, Row, Sqlite};
use std::path::Path;

// Declare submodules
pub mod events;
pub mod users;

use crate::models::{Event, User};

/// Handle to the on-device SQLite cache.
#[derive(Clone, Debug)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the cache file at `db_path`.
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create cache directory {}", parent.display()))?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let db_exists = Sqlite::database_exists(&db_url)
            .await
            .context("Failed to check if database exists")?;
        if !db_exists {
            info!("Creating cache database at {}", db_path.display());
            Sqlite::create_database(&db_url)
                .await
                .context("Failed to create database")?;
        }

        Self::connect(&db_url).await
    }

    /// Connects to an existing database URL and brings its schema up to date.
    pub async fn connect(db_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(db_url)
            .await
            .context("Failed to connect to database")?;

        run_schema(&pool).await.context("Failed to run database schema")?;

        // Caches written by older builds lack some columns
        ensure_migrations(&pool).await.context("Failed to ensure migrations")?;

        info!("Cache database initialized successfully");

        Ok(Database { pool })
    }

    // --- Event Delegates ---

    pub async fn get_events(&self) -> Result<Vec<Event>> {
        events::get_all(&self.pool).await
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Option<Event>> {
        events::get_by_id(&self.pool, event_id).await
    }

    pub async fn get_events_by_creator(&self, creator_id: &str) -> Result<Vec<Event>> {
        events::get_by_creator(&self.pool, creator_id).await
    }

    pub async fn replace_events(&self, snapshot: &[Event]) -> Result<()> {
        events::replace_all(&self.pool, snapshot).await
    }

    // --- User Delegates ---

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        users::get_by_id(&self.pool, user_id).await
    }

    pub async fn upsert_user(&self, user: &User) -> Result<()> {
        users::upsert(&self.pool, user).await
    }
}

async fn run_schema(pool: &SqlitePool) -> Result<()> {
    let schema = include_str!("schema.sql");

    let mut current_statement = String::new();
    for line in schema.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") || trimmed.is_empty() {
            continue;
        }

        current_statement.push_str(line);
        current_statement.push('\n');

        if trimmed.ends_with(';') {
            sqlx::query(&current_statement).execute(pool).await?;
            current_statement.clear();
        }
    }
    Ok(())
}

async fn ensure_migrations(pool: &SqlitePool) -> Result<()> {
    let rows = sqlx::query("PRAGMA table_info(events)")
        .fetch_all(pool)
        .await
        .context("Failed to fetch table info")?;

    let columns: Vec<String> = rows
        .iter()
        .map(|row| row.get::<String, _>("name"))
        .collect();

    if !columns.iter().any(|c| c == "attendee_names") {
        info!("Migrating: Adding attendee_names column to events table");
        sqlx::query("ALTER TABLE events ADD COLUMN attendee_names TEXT NOT NULL DEFAULT '{}'")
            .execute(pool)
            .await
            .context("Failed to add attendee_names column")?;
    }

    if !columns.iter().any(|c| c == "sun_type") {
        info!("Migrating: Adding sun_type column to events table");
        sqlx::query("ALTER TABLE events ADD COLUMN sun_type TEXT NOT NULL DEFAULT ''")
            .execute(pool)
            .await
            .context("Failed to add sun_type column")?;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) async fn create_test_database() -> Database {
    let temp_file = tempfile::NamedTempFile::new().unwrap();
    let (_, path) = temp_file.keep().unwrap();
    let db_path = format!("sqlite:{}", path.to_str().unwrap());
    Database::connect(&db_path).await.unwrap()
}
