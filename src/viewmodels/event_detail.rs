use crate::error::AppResult;
use crate::models::{Event, UiState};
use crate::repository::{AuthRepository, EventsRepository};
use std::sync::Arc;
use tokio::sync::watch;

/// Detail screen of a single event.
pub struct EventViewModel {
    events: Arc<EventsRepository>,
    auth: Arc<dyn AuthRepository>,
    action_state: watch::Sender<Option<UiState>>,
}

impl EventViewModel {
    pub fn new(events: Arc<EventsRepository>, auth: Arc<dyn AuthRepository>) -> Self {
        Self {
            events,
            auth,
            action_state: watch::channel(None).0,
        }
    }

    pub fn action_state(&self) -> Option<UiState> {
        self.action_state.borrow().clone()
    }

    pub fn subscribe_action_state(&self) -> watch::Receiver<Option<UiState>> {
        self.action_state.subscribe()
    }

    pub async fn get_event(&self, event_id: &str) -> AppResult<Option<Event>> {
        self.events.get_event_by_id(event_id).await
    }

    pub fn is_owner(&self, event: &Event) -> bool {
        self.auth
            .current_user_id()
            .map(|uid| event.is_created_by(&uid))
            .unwrap_or(false)
    }

    pub async fn join_event(&self, event_id: &str) {
        let Some(user_id) = self.auth.current_user_id() else {
            self.publish(UiState::Error("You must be logged in to join".to_string()));
            return;
        };

        self.publish(UiState::Loading);
        let display_name = self.auth.current_display_name();
        let next = match self
            .events
            .join_event(event_id, &user_id, display_name.as_deref())
            .await
        {
            Ok(()) => UiState::Success("Joined event".to_string()),
            Err(e) => UiState::Error(e.message_or("Join failed")),
        };
        self.publish(next);
    }

    pub async fn leave_event(&self, event_id: &str) {
        let Some(user_id) = self.auth.current_user_id() else {
            self.publish(UiState::Error("You must be logged in".to_string()));
            return;
        };

        self.publish(UiState::Loading);
        let next = match self.events.leave_event(event_id, &user_id).await {
            Ok(()) => UiState::Success("Left event".to_string()),
            Err(e) => UiState::Error(e.message_or("Leave failed")),
        };
        self.publish(next);
    }

    pub async fn delete_event(&self, event_id: &str) {
        self.publish(UiState::Loading);
        let next = match self.events.delete_event(event_id).await {
            Ok(()) => UiState::Success("Event deleted".to_string()),
            Err(e) => UiState::Error(e.message_or("Delete failed")),
        };
        self.publish(next);
    }

    fn publish(&self, state: UiState) {
        self.action_state.send_replace(Some(state));
    }
}
