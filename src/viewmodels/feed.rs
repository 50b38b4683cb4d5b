use crate::models::{build_feed_items, FeedItem, FeedSections, FeedState, UiState};
use crate::repository::{AuthRepository, EventsRepository};
use chrono::{Local, NaiveDateTime};
use log::warn;
use std::sync::Arc;
use tokio::sync::watch;

/// Home feed: the cached event list split into upcoming and past sections,
/// plus join and leave actions.
pub struct FeedViewModel {
    events: Arc<EventsRepository>,
    auth: Arc<dyn AuthRepository>,
    state: watch::Sender<FeedState>,
    join_state: watch::Sender<Option<UiState>>,
    sections: watch::Sender<FeedSections>,
}

impl FeedViewModel {
    /// Starts in `FeedState::Loading`; callers kick off the first `refresh`.
    pub fn new(events: Arc<EventsRepository>, auth: Arc<dyn AuthRepository>) -> Self {
        Self {
            events,
            auth,
            state: watch::channel(FeedState::Loading).0,
            join_state: watch::channel(None).0,
            sections: watch::channel(FeedSections::default()).0,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub fn join_state(&self) -> Option<UiState> {
        self.join_state.borrow().clone()
    }

    pub fn subscribe_join_state(&self) -> watch::Receiver<Option<UiState>> {
        self.join_state.subscribe()
    }

    pub fn sections(&self) -> FeedSections {
        *self.sections.borrow()
    }

    pub fn subscribe_sections(&self) -> watch::Receiver<FeedSections> {
        self.sections.subscribe()
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.auth.current_user_id()
    }

    /// Feed rows for the current cache and section state, relative to local now.
    pub fn feed_items(&self) -> Vec<FeedItem> {
        self.feed_items_at(Local::now().naive_local())
    }

    pub fn feed_items_at(&self, now: NaiveDateTime) -> Vec<FeedItem> {
        build_feed_items(&self.events.current_events(), self.sections(), now)
    }

    pub fn toggle_upcoming_section(&self) {
        self.sections.send_modify(|s| s.upcoming_expanded = !s.upcoming_expanded);
    }

    pub fn toggle_past_section(&self) {
        self.sections.send_modify(|s| s.past_expanded = !s.past_expanded);
    }

    pub async fn refresh(&self) {
        self.state.send_replace(FeedState::Loading);
        let next = match self.events.refresh_events().await {
            Ok(_) => FeedState::Idle,
            Err(e) => {
                warn!("Feed refresh failed: {}", e);
                FeedState::Error(e.message_or("Failed to load feed"))
            }
        };
        self.state.send_replace(next);
    }

    pub async fn join_event(&self, event_id: &str) {
        let Some(user_id) = self.auth.current_user_id() else {
            self.join_state
                .send_replace(Some(UiState::Error("You must be logged in to join".to_string())));
            return;
        };

        self.join_state.send_replace(Some(UiState::Loading));
        let display_name = self.auth.current_display_name();
        let next = match self
            .events
            .join_event(event_id, &user_id, display_name.as_deref())
            .await
        {
            Ok(()) => UiState::Success("Joined event".to_string()),
            Err(e) => UiState::Error(e.message_or("Join failed")),
        };
        self.join_state.send_replace(Some(next));
    }

    pub async fn leave_event(&self, event_id: &str) {
        let Some(user_id) = self.auth.current_user_id() else {
            self.join_state
                .send_replace(Some(UiState::Error("You must be logged in".to_string())));
            return;
        };

        self.join_state.send_replace(Some(UiState::Loading));
        let next = match self.events.leave_event(event_id, &user_id).await {
            Ok(()) => UiState::Success("Left event".to_string()),
            Err(e) => UiState::Error(e.message_or("Leave failed")),
        };
        self.join_state.send_replace(Some(next));
    }
}
