// file: src/models/mod.rs

pub mod event;
pub mod feed;
pub mod solar;
pub mod state;
pub mod sync;
pub mod user;

// Flattened so callers can write `use crate::models::Event`.
pub use event::{format_event_time, parse_event_time, Event, SunType, EVENT_TIME_FORMAT};
pub use feed::{build_feed_items, FeedItem, FeedSections, PAST_SECTION_TITLE, UPCOMING_SECTION_TITLE};
pub use solar::{SolarData, SolarResult, SunriseSunsetResponse, SunriseSunsetResults};
pub use state::{FeedState, FormState, ProfileUi, SolarState, UiState};
pub use sync::RefreshResult;
pub use user::User;
