// file: src/models/feed.rs
use super::event::Event;
use chrono::NaiveDateTime;

pub const UPCOMING_SECTION_TITLE: &str = "Upcoming Events";
pub const PAST_SECTION_TITLE: &str = "Past Events";

/// One row of the feed list: a collapsible section header or an event card.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedItem {
    SectionHeader {
        title: String,
        count: usize,
        is_expanded: bool,
    },
    EventItem {
        event: Event,
        is_past: bool,
    },
}

impl FeedItem {
    /// Stable id used to diff list rows.
    pub fn id(&self) -> String {
        match self {
            FeedItem::SectionHeader { title, .. } => format!("header_{}", title),
            FeedItem::EventItem { event, .. } => event.id.clone(),
        }
    }
}

/// Expand/collapse state of the two feed sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSections {
    pub upcoming_expanded: bool,
    pub past_expanded: bool,
}

impl Default for FeedSections {
    fn default() -> Self {
        Self {
            upcoming_expanded: true,
            past_expanded: false,
        }
    }
}

/// Splits `events` into upcoming and past sections relative to `now`.
///
/// Input order is preserved inside each section. A section header is only
/// emitted when the section has events; its events follow only while the
/// section is expanded.
pub fn build_feed_items(events: &[Event], sections: FeedSections, now: NaiveDateTime) -> Vec<FeedItem> {
    let (past, upcoming): (Vec<&Event>, Vec<&Event>) =
        events.iter().partition(|event| event.is_past_at(now));

    let mut items = Vec::with_capacity(events.len() + 2);

    if !upcoming.is_empty() {
        items.push(FeedItem::SectionHeader {
            title: UPCOMING_SECTION_TITLE.to_string(),
            count: upcoming.len(),
            is_expanded: sections.upcoming_expanded,
        });
        if sections.upcoming_expanded {
            items.extend(upcoming.into_iter().map(|event| FeedItem::EventItem {
                event: event.clone(),
                is_past: false,
            }));
        }
    }

    if !past.is_empty() {
        items.push(FeedItem::SectionHeader {
            title: PAST_SECTION_TITLE.to_string(),
            count: past.len(),
            is_expanded: sections.past_expanded,
        });
        if sections.past_expanded {
            items.extend(past.into_iter().map(|event| FeedItem::EventItem {
                event: event.clone(),
                is_past: true,
            }));
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::sample_event;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap()
    }

    fn mixed_events() -> Vec<Event> {
        vec![
            sample_event("old", "Feb 01, 2026 6:30 AM"),
            sample_event("soon", "Mar 02, 2026 6:30 AM"),
            sample_event("later", "Apr 10, 2026 7:45 PM"),
            sample_event("garbled", "not a date"),
        ]
    }

    fn ids(items: &[FeedItem]) -> Vec<String> {
        items.iter().map(FeedItem::id).collect()
    }

    #[test]
    fn test_default_sections_show_upcoming_only() {
        let items = build_feed_items(&mixed_events(), FeedSections::default(), now());
        assert_eq!(
            ids(&items),
            vec!["header_Upcoming Events", "soon", "later", "garbled", "header_Past Events"]
        );
        assert_eq!(
            items[0],
            FeedItem::SectionHeader {
                title: UPCOMING_SECTION_TITLE.to_string(),
                count: 3,
                is_expanded: true,
            }
        );
        assert_eq!(
            items[4],
            FeedItem::SectionHeader {
                title: PAST_SECTION_TITLE.to_string(),
                count: 1,
                is_expanded: false,
            }
        );
    }

    #[test]
    fn test_expanded_past_items_are_flagged() {
        let sections = FeedSections { upcoming_expanded: false, past_expanded: true };
        let items = build_feed_items(&mixed_events(), sections, now());
        assert_eq!(ids(&items), vec!["header_Upcoming Events", "header_Past Events", "old"]);
        assert!(matches!(&items[2], FeedItem::EventItem { is_past: true, .. }));
    }

    #[test]
    fn test_empty_sections_have_no_header() {
        let only_future = vec![sample_event("soon", "Mar 02, 2026 6:30 AM")];
        let items = build_feed_items(&only_future, FeedSections::default(), now());
        assert_eq!(ids(&items), vec!["header_Upcoming Events", "soon"]);

        assert!(build_feed_items(&[], FeedSections::default(), now()).is_empty());
    }
}
