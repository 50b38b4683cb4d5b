// file: src/database/events.rs
use crate::models::{Event, SunType};
use crate::utils::logging;
use anyhow::{Context, Result};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use std::collections::BTreeMap;
use std::time::Instant;

const EVENT_COLUMNS: &str = "id, title, location, time, description, image_url, participants_count, \
     attendee_ids, attendee_names, creator_id, sun_type";

/// Row shape of the `events` table. List and map columns hold JSON text.
#[derive(Debug, FromRow)]
struct EventRow {
    id: String,
    title: String,
    location: String,
    time: String,
    description: String,
    image_url: String,
    participants_count: i64,
    attendee_ids: String,
    attendee_names: String,
    creator_id: String,
    sun_type: String,
}

impl EventRow {
    fn into_event(self) -> Event {
        let attendee_ids: Vec<String> = serde_json::from_str(&self.attendee_ids).unwrap_or_else(|e| {
            log::warn!("Cached attendee list for event {} is unreadable: {}", self.id, e);
            Vec::new()
        });
        let attendee_names: BTreeMap<String, String> = serde_json::from_str(&self.attendee_names)
            .unwrap_or_else(|e| {
                log::warn!("Cached attendee names for event {} are unreadable: {}", self.id, e);
                BTreeMap::new()
            });

        Event {
            id: self.id,
            title: self.title,
            location: self.location,
            time: self.time,
            description: self.description,
            image_url: self.image_url,
            participants_count: self.participants_count,
            attendee_ids,
            attendee_names,
            creator_id: self.creator_id,
            sun_type: SunType::parse(&self.sun_type),
        }
    }
}

/// All cached events in the order the last snapshot delivered them.
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Event>> {
    let rows = sqlx::query_as::<_, EventRow>(&format!(
        "SELECT {} FROM events ORDER BY rowid ASC",
        EVENT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(EventRow::into_event).collect())
}

pub async fn get_by_id(pool: &SqlitePool, event_id: &str) -> Result<Option<Event>> {
    let row = sqlx::query_as::<_, EventRow>(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
        .bind(event_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(EventRow::into_event))
}

pub async fn get_by_creator(pool: &SqlitePool, creator_id: &str) -> Result<Vec<Event>> {
    let rows = sqlx::query_as::<_, EventRow>(&format!(
        "SELECT {} FROM events WHERE creator_id = ? ORDER BY rowid ASC",
        EVENT_COLUMNS
    ))
    .bind(creator_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(EventRow::into_event).collect())
}

/// Replaces the whole cache with `snapshot` inside one transaction.
///
/// Either every row of the previous snapshot is gone and every event of the
/// new one is present, or (on error) the previous snapshot is left untouched.
pub async fn replace_all(pool: &SqlitePool, snapshot: &[Event]) -> Result<()> {
    let start = Instant::now();

    let mut tx = pool.begin().await.context("Failed to begin cache transaction")?;

    sqlx::query("DELETE FROM events")
        .execute(&mut *tx)
        .await
        .context("Failed to clear cached events")?;

    for event in snapshot {
        insert(&mut tx, event)
            .await
            .with_context(|| format!("Failed to cache event {}", event.id))?;
    }

    tx.commit().await.context("Failed to commit cache transaction")?;

    logging::log_database_operation("replace_all", "events", start.elapsed().as_millis() as u64);
    Ok(())
}

async fn insert(tx: &mut Transaction<'_, Sqlite>, event: &Event) -> Result<()> {
    let attendee_ids = serde_json::to_string(&event.attendee_ids)?;
    let attendee_names = serde_json::to_string(&event.attendee_names)?;

    // A snapshot may carry the same id twice; the later document wins.
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO events (
            id, title, location, time, description, image_url, participants_count,
            attendee_ids, attendee_names, creator_id, sun_type, cached_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(&event.id)
    .bind(&event.title)
    .bind(&event.location)
    .bind(&event.time)
    .bind(&event.description)
    .bind(&event.image_url)
    .bind(event.participants_count)
    .bind(attendee_ids)
    .bind(attendee_names)
    .bind(&event.creator_id)
    .bind(event.sun_type.as_str())
    .execute(&mut **tx)
    .await?;

    Ok(())
}
