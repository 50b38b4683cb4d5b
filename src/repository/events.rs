//! Event feed repository
//!
//! The remote document store is the source of truth; the SQLite cache is a
//! mirror of the last successful fetch. Every remote write is followed by a
//! full refresh rather than a local patch.

use crate::database::Database;
use crate::error::AppResult;
use crate::models::{Event, RefreshResult, SunType};
use crate::remote::{FieldUpdate, RemoteDocument, RemoteEventStore};
use crate::utils::logging;
use log::{info, warn};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};

pub const EVENTS_COLLECTION: &str = "events";

/// Name recorded for attendees whose profile has no display name.
pub const DEFAULT_ATTENDEE_NAME: &str = "User";

const FIELD_ID: &str = "id";
const FIELD_TITLE: &str = "title";
const FIELD_LOCATION: &str = "location";
const FIELD_TIME: &str = "time";
const FIELD_DESCRIPTION: &str = "description";
const FIELD_IMAGE_URL: &str = "imageUrl";
const FIELD_PARTICIPANTS_COUNT: &str = "participantsCount";
const FIELD_ATTENDEES: &str = "attendees";
const FIELD_ATTENDEE_NAMES: &str = "attendeeNames";
const FIELD_CREATOR_ID: &str = "creatorId";
const FIELD_SUN_TYPE: &str = "sunType";

/// Editable fields of an existing event. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub location: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sun_type: Option<SunType>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }

    fn into_updates(self) -> Vec<FieldUpdate> {
        let mut updates = Vec::new();
        let text_fields = [
            (FIELD_TITLE, self.title),
            (FIELD_LOCATION, self.location),
            (FIELD_TIME, self.time),
            (FIELD_DESCRIPTION, self.description),
            (FIELD_IMAGE_URL, self.image_url),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                updates.push(FieldUpdate::set(field, value));
            }
        }
        if let Some(sun_type) = self.sun_type {
            updates.push(FieldUpdate::set(FIELD_SUN_TYPE, sun_type.as_str()));
        }
        updates
    }
}

pub struct EventsRepository {
    db: Database,
    remote: Arc<dyn RemoteEventStore>,
    feed: watch::Sender<Vec<Event>>,
    // Held from fetch to publish so an older snapshot never lands after a newer one
    refresh_gate: Mutex<()>,
}

impl EventsRepository {
    /// Builds the repository and seeds the feed from whatever the cache holds,
    /// so the list is available before the first refresh completes.
    pub async fn new(db: Database, remote: Arc<dyn RemoteEventStore>) -> AppResult<Self> {
        let cached = sort_by_event_time(db.get_events().await?);
        let (feed, _) = watch::channel(cached);
        Ok(Self {
            db,
            remote,
            feed,
            refresh_gate: Mutex::new(()),
        })
    }

    /// Cached events, earliest first. Events whose time does not parse go last.
    pub async fn get_events(&self) -> AppResult<Vec<Event>> {
        Ok(sort_by_event_time(self.db.get_events().await?))
    }

    /// Receiver that sees the sorted feed after every cache reconciliation.
    pub fn watch_events(&self) -> watch::Receiver<Vec<Event>> {
        self.feed.subscribe()
    }

    /// Last published snapshot of the feed, without touching the cache.
    pub fn current_events(&self) -> Vec<Event> {
        self.feed.borrow().clone()
    }

    pub async fn get_event_by_id(&self, id: &str) -> AppResult<Option<Event>> {
        Ok(self.db.get_event(id).await?)
    }

    pub async fn get_events_by_creator(&self, creator_id: &str) -> AppResult<Vec<Event>> {
        Ok(sort_by_event_time(self.db.get_events_by_creator(creator_id).await?))
    }

    /// Pulls the whole remote collection and replaces the cache with it.
    ///
    /// Documents missing a title, location or time are skipped. When the
    /// fetch or the cache write fails the previous cache is kept as is.
    /// Concurrent refreshes run one after another.
    pub async fn refresh_events(&self) -> AppResult<RefreshResult> {
        let _gate = self.refresh_gate.lock().await;
        let start = Instant::now();

        let documents = self.remote.list_documents(EVENTS_COLLECTION).await?;
        let total = documents.len();
        let snapshot: Vec<Event> = documents.iter().filter_map(event_from_document).collect();
        let skipped = total - snapshot.len();
        if skipped > 0 {
            warn!("Skipped {} event documents without title, location or time", skipped);
        }

        self.db.replace_events(&snapshot).await?;
        self.publish_cache().await?;

        logging::log_feed_refresh(snapshot.len(), skipped, start.elapsed().as_millis() as u64);
        Ok(RefreshResult::with_counts(snapshot.len(), skipped))
    }

    /// Adds `user_id` to the event, bumps the participant counter and records
    /// the attendee's display name, then refreshes the feed.
    ///
    /// The three writes are independent: if one fails, the earlier ones stay
    /// applied remotely and the error is returned without a refresh.
    /// A blank `display_name` is recorded as [`DEFAULT_ATTENDEE_NAME`], not as `""`.
    pub async fn join_event(&self, event_id: &str, user_id: &str, display_name: Option<&str>) -> AppResult<()> {
        let name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_ATTENDEE_NAME);

        let writes = vec![
            FieldUpdate::array_union(FIELD_ATTENDEES, user_id),
            FieldUpdate::increment(FIELD_PARTICIPANTS_COUNT, 1),
            FieldUpdate::set(format!("{}.{}", FIELD_ATTENDEE_NAMES, user_id), name),
        ];
        self.apply_membership_writes("join", event_id, user_id, writes).await?;

        info!("User {} joined event {}", user_id, event_id);
        self.refresh_events().await?;
        Ok(())
    }

    /// Reverse of [`join_event`](Self::join_event), with the same partial-write caveat.
    pub async fn leave_event(&self, event_id: &str, user_id: &str) -> AppResult<()> {
        let writes = vec![
            FieldUpdate::array_remove(FIELD_ATTENDEES, user_id),
            FieldUpdate::increment(FIELD_PARTICIPANTS_COUNT, -1),
            FieldUpdate::delete(format!("{}.{}", FIELD_ATTENDEE_NAMES, user_id)),
        ];
        self.apply_membership_writes("leave", event_id, user_id, writes).await?;

        info!("User {} left event {}", user_id, event_id);
        self.refresh_events().await?;
        Ok(())
    }

    pub async fn create_event(&self, event: &Event) -> AppResult<()> {
        self.remote
            .set_document(EVENTS_COLLECTION, &event.id, event_document_data(event))
            .await?;
        logging::log_remote_write("create", &event.id);

        self.refresh_events().await?;
        Ok(())
    }

    pub async fn update_event(&self, event_id: &str, patch: EventPatch) -> AppResult<()> {
        self.remote
            .update_fields(EVENTS_COLLECTION, event_id, patch.into_updates())
            .await?;
        logging::log_remote_write("update", event_id);

        self.refresh_events().await?;
        Ok(())
    }

    pub async fn delete_event(&self, event_id: &str) -> AppResult<()> {
        self.remote.delete_document(EVENTS_COLLECTION, event_id).await?;
        logging::log_remote_write("delete", event_id);

        self.refresh_events().await?;
        Ok(())
    }

    async fn apply_membership_writes(
        &self,
        action: &str,
        event_id: &str,
        user_id: &str,
        writes: Vec<FieldUpdate>,
    ) -> AppResult<()> {
        let total = writes.len();
        for (applied, write) in writes.into_iter().enumerate() {
            let path = write.path.clone();
            if let Err(e) = self.remote.update_fields(EVENTS_COLLECTION, event_id, vec![write]).await {
                if applied > 0 {
                    warn!(
                        "{} of event {} by {} stopped after {} of {} writes; attendees and counter may disagree until the next refresh",
                        action, event_id, user_id, applied, total
                    );
                }
                return Err(e);
            }
            logging::log_remote_write(&format!("{} ({})", action, path), event_id);
        }
        Ok(())
    }

    async fn publish_cache(&self) -> AppResult<()> {
        let events = sort_by_event_time(self.db.get_events().await?);
        self.feed.send_replace(events);
        Ok(())
    }
}

fn sort_by_event_time(mut events: Vec<Event>) -> Vec<Event> {
    // Stable: equal or unparseable times keep cache order
    events.sort_by_key(|event| {
        let time = event.parsed_time();
        (time.is_none(), time)
    });
    events
}

fn event_from_document(doc: &RemoteDocument) -> Option<Event> {
    let title = doc.get_str(FIELD_TITLE)?;
    let location = doc.get_str(FIELD_LOCATION)?;
    let time = doc.get_str(FIELD_TIME)?;

    Some(Event {
        id: doc.get_str(FIELD_ID).unwrap_or(&doc.id).to_string(),
        title: title.to_string(),
        location: location.to_string(),
        time: time.to_string(),
        description: doc.get_str(FIELD_DESCRIPTION).unwrap_or_default().to_string(),
        image_url: doc.get_str(FIELD_IMAGE_URL).unwrap_or_default().to_string(),
        participants_count: doc.get_i64(FIELD_PARTICIPANTS_COUNT).unwrap_or(0),
        attendee_ids: doc.get_str_list(FIELD_ATTENDEES),
        attendee_names: doc.get_str_map(FIELD_ATTENDEE_NAMES).into_iter().collect(),
        creator_id: doc.get_str(FIELD_CREATOR_ID).unwrap_or_default().to_string(),
        sun_type: SunType::parse(doc.get_str(FIELD_SUN_TYPE).unwrap_or_default()),
    })
}

fn event_document_data(event: &Event) -> Map<String, Value> {
    let attendee_names: Map<String, Value> = event
        .attendee_names
        .iter()
        .map(|(id, name)| (id.clone(), Value::from(name.as_str())))
        .collect();

    let mut data = Map::new();
    data.insert(FIELD_ID.to_string(), Value::from(event.id.as_str()));
    data.insert(FIELD_TITLE.to_string(), Value::from(event.title.as_str()));
    data.insert(FIELD_LOCATION.to_string(), Value::from(event.location.as_str()));
    data.insert(FIELD_TIME.to_string(), Value::from(event.time.as_str()));
    data.insert(FIELD_DESCRIPTION.to_string(), Value::from(event.description.as_str()));
    data.insert(FIELD_IMAGE_URL.to_string(), Value::from(event.image_url.as_str()));
    data.insert(FIELD_PARTICIPANTS_COUNT.to_string(), Value::from(event.participants_count));
    data.insert(FIELD_ATTENDEES.to_string(), Value::from(event.attendee_ids.clone()));
    data.insert(FIELD_ATTENDEE_NAMES.to_string(), Value::Object(attendee_names));
    data.insert(FIELD_CREATOR_ID.to_string(), Value::from(event.creator_id.as_str()));
    data.insert(FIELD_SUN_TYPE.to_string(), Value::from(event.sun_type.as_str()));
    data
}
