use crate::error::{AppError, AppResult};
use crate::models::{Event, FormState, SolarResult, SolarState, SunType};
use crate::repository::{AuthRepository, EventPatch, EventsRepository, StorageRepository, WeatherRepository};
use crate::utils::is_blank;
use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Text fields shared by the create and edit forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub title: String,
    pub location: String,
    pub time: String,
    pub description: String,
    pub sun_type: SunType,
}

impl EventForm {
    fn has_blank_field(&self) -> bool {
        is_blank(&self.title) || is_blank(&self.location) || is_blank(&self.description)
    }
}

/// Event editor used both for new events and for editing existing ones.
pub struct CreateEventViewModel {
    events: Arc<EventsRepository>,
    auth: Arc<dyn AuthRepository>,
    storage: StorageRepository,
    weather: Arc<WeatherRepository>,
    state: watch::Sender<Option<FormState>>,
    solar_state: watch::Sender<Option<SolarState>>,
}

impl CreateEventViewModel {
    pub fn new(
        events: Arc<EventsRepository>,
        auth: Arc<dyn AuthRepository>,
        storage: StorageRepository,
        weather: Arc<WeatherRepository>,
    ) -> Self {
        Self {
            events,
            auth,
            storage,
            weather,
            state: watch::channel(None).0,
            solar_state: watch::channel(None).0,
        }
    }

    pub fn state(&self) -> Option<FormState> {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<Option<FormState>> {
        self.state.subscribe()
    }

    pub fn solar_state(&self) -> Option<SolarState> {
        self.solar_state.borrow().clone()
    }

    pub fn subscribe_solar_state(&self) -> watch::Receiver<Option<SolarState>> {
        self.solar_state.subscribe()
    }

    /// Cached copy of an event to prefill the edit form.
    pub async fn load_event(&self, event_id: &str) -> AppResult<Option<Event>> {
        self.events.get_event_by_id(event_id).await
    }

    pub async fn create_event(&self, form: EventForm, image: Option<Vec<u8>>) {
        let Some(user_id) = self.auth.current_user_id() else {
            self.fail("You must be logged in to create events");
            return;
        };
        let image = match image {
            Some(bytes) if !form.has_blank_field() && !bytes.is_empty() => bytes,
            _ => {
                self.fail("All fields and image are required");
                return;
            }
        };

        self.state.send_replace(Some(FormState::Loading));
        let next = match self.submit_new(&user_id, form, &image).await {
            Ok(event_id) => {
                info!("Created event {}", event_id);
                FormState::Success
            }
            Err(e) => FormState::Error(e.message_or("Create failed")),
        };
        self.state.send_replace(Some(next));
    }

    /// Updates the event's fields. The image is only re-uploaded when
    /// `new_image` is given; otherwise `existing_image_url` is kept.
    pub async fn update_event(
        &self,
        event_id: &str,
        form: EventForm,
        new_image: Option<Vec<u8>>,
        existing_image_url: &str,
    ) {
        let Some(user_id) = self.auth.current_user_id() else {
            self.fail("You must be logged in to edit events");
            return;
        };
        if form.has_blank_field() {
            self.fail("All fields are required");
            return;
        }

        self.state.send_replace(Some(FormState::Loading));
        let next = match self
            .submit_update(&user_id, event_id, form, new_image, existing_image_url)
            .await
        {
            Ok(()) => FormState::Success,
            Err(e) => FormState::Error(e.message_or("Update failed")),
        };
        self.state.send_replace(Some(next));
    }

    pub async fn fetch_sun_times(&self, latitude: f64, longitude: f64) {
        self.solar_state.send_replace(Some(SolarState::Loading));
        let next = match self.weather.fetch_solar_data(latitude, longitude).await {
            SolarResult::Success(data) => SolarState::Success(data),
            SolarResult::Error(message) => SolarState::Error(message),
        };
        self.solar_state.send_replace(Some(next));
    }

    async fn submit_new(&self, user_id: &str, form: EventForm, image: &[u8]) -> AppResult<String> {
        let image_url = self.storage.upload_event_image(user_id, image).await?;
        let event = Event {
            id: Uuid::new_v4().to_string(),
            title: form.title.trim().to_string(),
            location: form.location.trim().to_string(),
            time: form.time,
            description: form.description.trim().to_string(),
            image_url,
            participants_count: 0,
            attendee_ids: Vec::new(),
            attendee_names: BTreeMap::new(),
            creator_id: user_id.to_string(),
            sun_type: form.sun_type,
        };
        self.events.create_event(&event).await?;
        Ok(event.id)
    }

    async fn submit_update(
        &self,
        user_id: &str,
        event_id: &str,
        form: EventForm,
        new_image: Option<Vec<u8>>,
        existing_image_url: &str,
    ) -> AppResult<()> {
        if is_blank(event_id) {
            return Err(AppError::invalid_input("Missing event id"));
        }
        let image_url = match new_image {
            Some(bytes) => self.storage.upload_event_image(user_id, &bytes).await?,
            None => existing_image_url.to_string(),
        };

        let patch = EventPatch {
            title: Some(form.title.trim().to_string()),
            location: Some(form.location.trim().to_string()),
            time: Some(form.time),
            description: Some(form.description.trim().to_string()),
            image_url: Some(image_url),
            sun_type: Some(form.sun_type),
        };
        self.events.update_event(event_id, patch).await
    }

    fn fail(&self, message: &str) {
        self.state.send_replace(Some(FormState::Error(message.to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_config::HttpConfig;
    use crate::utils::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
    use crate::viewmodels::test_support::Fixture;

    fn view_model(fixture: &Fixture) -> CreateEventViewModel {
        let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default()));
        let weather = WeatherRepository::new("http://127.0.0.1:9/", HttpConfig::solar_api(), breaker).unwrap();
        CreateEventViewModel::new(
            fixture.events.clone(),
            fixture.auth.clone(),
            fixture.storage.clone(),
            Arc::new(weather),
        )
    }

    fn form() -> EventForm {
        EventForm {
            title: "  Solstice sunrise ".to_string(),
            location: "Twin Peaks".to_string(),
            time: "Jun 21, 2026 5:42 AM".to_string(),
            description: "Coffee provided".to_string(),
            sun_type: SunType::Sunrise,
        }
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let fixture = Fixture::new().await;
        let vm = view_model(&fixture);
        vm.create_event(form(), Some(b"img".to_vec())).await;
        assert_eq!(
            vm.state(),
            Some(FormState::Error("You must be logged in to create events".to_string()))
        );
    }

    #[tokio::test]
    async fn test_create_requires_fields_and_image() {
        let fixture = Fixture::new().await;
        fixture.sign_in("ada@example.com", None).await;
        let vm = view_model(&fixture);
        let expected = Some(FormState::Error("All fields and image are required".to_string()));

        vm.create_event(form(), None).await;
        assert_eq!(vm.state(), expected);

        let mut blank = form();
        blank.description = "   ".to_string();
        vm.create_event(blank, Some(b"img".to_vec())).await;
        assert_eq!(vm.state(), expected);
        assert_eq!(fixture.store.document_count("events").await, 0);
    }

    #[tokio::test]
    async fn test_create_event_uploads_and_publishes() {
        let fixture = Fixture::new().await;
        let uid = fixture.sign_in("ada@example.com", None).await;
        let vm = view_model(&fixture);

        vm.create_event(form(), Some(b"img".to_vec())).await;
        assert_eq!(vm.state(), Some(FormState::Success));

        let mine = fixture.events.get_events_by_creator(&uid).await.unwrap();
        assert_eq!(mine.len(), 1);
        let event = &mine[0];
        assert_eq!(event.title, "Solstice sunrise");
        assert_eq!(event.participants_count, 0);
        assert_eq!(event.sun_type, SunType::Sunrise);
        assert!(event.image_url.contains("/events/"));
        assert!(Uuid::parse_str(&event.id).is_ok());
    }

    #[tokio::test]
    async fn test_update_keeps_existing_image() {
        let fixture = Fixture::new().await;
        fixture.sign_in("ada@example.com", None).await;
        let vm = view_model(&fixture);
        vm.create_event(form(), Some(b"img".to_vec())).await;
        let original = fixture.events.get_events().await.unwrap().remove(0);

        let mut edited = form();
        edited.title = "Solstice sunset".to_string();
        edited.sun_type = SunType::Sunset;
        vm.update_event(&original.id, edited, None, &original.image_url).await;
        assert_eq!(vm.state(), Some(FormState::Success));

        let updated = vm.load_event(&original.id).await.unwrap().unwrap();
        assert_eq!(updated.title, "Solstice sunset");
        assert_eq!(updated.sun_type, SunType::Sunset);
        assert_eq!(updated.image_url, original.image_url);
    }

    #[tokio::test]
    async fn test_update_validation() {
        let fixture = Fixture::new().await;
        let vm = view_model(&fixture);
        vm.update_event("e1", form(), None, "").await;
        assert_eq!(
            vm.state(),
            Some(FormState::Error("You must be logged in to edit events".to_string()))
        );

        fixture.sign_in("ada@example.com", None).await;
        let mut blank = form();
        blank.title = String::new();
        vm.update_event("e1", blank, None, "").await;
        assert_eq!(vm.state(), Some(FormState::Error("All fields are required".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_sun_times_rejects_bad_coordinates() {
        let fixture = Fixture::new().await;
        let vm = view_model(&fixture);
        vm.fetch_sun_times(200.0, 0.0).await;
        assert!(matches!(vm.solar_state(), Some(SolarState::Error(_))));
    }
}
