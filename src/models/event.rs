// file: src/models/event.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display format of `Event::time`, e.g. `Jun 21, 2026 5:42 AM`.
pub const EVENT_TIME_FORMAT: &str = "%b %d, %Y %-I:%M %p";

// Parsing accepts one- or two-digit hours, so the padding flag is not needed.
const EVENT_TIME_PARSE_FORMAT: &str = "%b %d, %Y %I:%M %p";

/// Parses an event time string as local wall-clock time.
pub fn parse_event_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), EVENT_TIME_PARSE_FORMAT).ok()
}

pub fn format_event_time(time: NaiveDateTime) -> String {
    time.format(EVENT_TIME_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SunType {
    #[serde(rename = "sunrise")]
    Sunrise,
    #[serde(rename = "sunset")]
    Sunset,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl SunType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SunType::Sunrise => "sunrise",
            SunType::Sunset => "sunset",
            SunType::Unspecified => "",
        }
    }

    /// Lenient parse used for remote and cached values. Anything unknown
    /// is treated as unspecified.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "sunrise" => SunType::Sunrise,
            "sunset" => SunType::Sunset,
            _ => SunType::Unspecified,
        }
    }
}

/// A meetup as shown in the feed. `attendee_names` maps user id to the
/// display name captured when that user joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub location: String,
    pub time: String,
    pub description: String,
    pub image_url: String,
    pub participants_count: i64,
    pub attendee_ids: Vec<String>,
    pub attendee_names: BTreeMap<String, String>,
    pub creator_id: String,
    pub sun_type: SunType,
}

impl Event {
    pub fn parsed_time(&self) -> Option<NaiveDateTime> {
        parse_event_time(&self.time)
    }

    /// An event is past only when its time parses and lies before `now`.
    /// Unparseable times are never considered past.
    pub fn is_past_at(&self, now: NaiveDateTime) -> bool {
        matches!(self.parsed_time(), Some(time) if time < now)
    }

    pub fn is_created_by(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }

    pub fn is_attending(&self, user_id: &str) -> bool {
        self.attendee_ids.iter().any(|id| id == user_id)
    }
}

#[cfg(test)]
pub(crate) fn sample_event(id: &str, time: &str) -> Event {
    Event {
        id: id.to_string(),
        title: format!("Event {}", id),
        location: "Twin Peaks".to_string(),
        time: time.to_string(),
        description: "Bring a blanket".to_string(),
        image_url: String::new(),
        participants_count: 0,
        attendee_ids: Vec::new(),
        attendee_names: BTreeMap::new(),
        creator_id: "creator".to_string(),
        sun_type: SunType::Sunrise,
    }
}
