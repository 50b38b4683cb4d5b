use crate::error::AppResult;
use crate::models::{Event, FormState, ProfileUi, User};
use crate::repository::{AuthRepository, EventsRepository, UserRepository};
use log::warn;
use std::sync::Arc;
use tokio::sync::watch;

pub const DEFAULT_PROFILE_NAME: &str = "SunSeeker User";

pub struct ProfileViewModel {
    events: Arc<EventsRepository>,
    auth: Arc<dyn AuthRepository>,
    users: UserRepository,
    profile_state: watch::Sender<Option<FormState>>,
    profile_ui: watch::Sender<ProfileUi>,
}

impl ProfileViewModel {
    pub fn new(events: Arc<EventsRepository>, auth: Arc<dyn AuthRepository>, users: UserRepository) -> Self {
        let profile_ui = watch::channel(current_profile(auth.as_ref())).0;
        Self {
            events,
            auth,
            users,
            profile_state: watch::channel(None).0,
            profile_ui,
        }
    }

    pub fn profile_state(&self) -> Option<FormState> {
        self.profile_state.borrow().clone()
    }

    pub fn subscribe_profile_state(&self) -> watch::Receiver<Option<FormState>> {
        self.profile_state.subscribe()
    }

    pub fn profile_ui(&self) -> ProfileUi {
        self.profile_ui.borrow().clone()
    }

    pub fn subscribe_profile_ui(&self) -> watch::Receiver<ProfileUi> {
        self.profile_ui.subscribe()
    }

    /// Events in the current feed created by the signed-in user.
    pub fn my_events(&self) -> Vec<Event> {
        match self.auth.current_user_id() {
            Some(uid) => self
                .events
                .current_events()
                .into_iter()
                .filter(|event| event.is_created_by(&uid))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn refresh_profile(&self) {
        self.profile_ui.send_replace(current_profile(self.auth.as_ref()));
    }

    pub async fn update_profile(&self, display_name: &str, photo: Option<Vec<u8>>) {
        let Some(user_id) = self.auth.current_user_id() else {
            self.profile_state
                .send_replace(Some(FormState::Error("Not logged in".to_string())));
            return;
        };

        self.profile_state.send_replace(Some(FormState::Loading));
        let next = match self.apply_profile_update(&user_id, display_name, photo).await {
            Ok(()) => {
                self.refresh_profile();
                FormState::Success
            }
            Err(e) => FormState::Error(e.message_or("Update failed")),
        };
        self.profile_state.send_replace(Some(next));
    }

    /// Cached copy of the signed-in user's profile.
    pub async fn cached_user(&self) -> AppResult<Option<User>> {
        match self.auth.current_user_id() {
            Some(uid) => self.users.get_user_by_id(&uid).await,
            None => Ok(None),
        }
    }

    pub fn logout(&self) {
        self.auth.logout();
        self.refresh_profile();
    }

    async fn apply_profile_update(&self, user_id: &str, display_name: &str, photo: Option<Vec<u8>>) -> AppResult<()> {
        self.auth.update_profile(display_name.trim(), photo).await?;

        // Mirror into the local table so the profile renders offline
        let user = User::new(
            user_id.to_string(),
            self.auth
                .current_display_name()
                .unwrap_or_else(|| display_name.trim().to_string()),
            self.auth.current_email().unwrap_or_default(),
            self.auth.current_photo_url(),
        );
        self.users.upsert_user(&user).await.map_err(|e| {
            warn!("Profile updated but local copy was not saved: {}", e);
            e
        })
    }
}

fn current_profile(auth: &dyn AuthRepository) -> ProfileUi {
    ProfileUi {
        name: auth
            .current_display_name()
            .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string()),
        photo_url: auth.current_photo_url(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::sample_event;
    use crate::viewmodels::test_support::Fixture;

    fn view_model(fixture: &Fixture) -> ProfileViewModel {
        ProfileViewModel::new(fixture.events.clone(), fixture.auth.clone(), fixture.users.clone())
    }

    #[tokio::test]
    async fn test_profile_defaults_without_name() {
        let fixture = Fixture::new().await;
        let vm = view_model(&fixture);
        assert_eq!(vm.profile_ui(), ProfileUi { name: DEFAULT_PROFILE_NAME.to_string(), photo_url: None });
        assert!(vm.my_events().is_empty());
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let fixture = Fixture::new().await;
        let vm = view_model(&fixture);
        vm.update_profile("Ada", None).await;
        assert_eq!(vm.profile_state(), Some(FormState::Error("Not logged in".to_string())));
    }

    #[tokio::test]
    async fn test_update_profile_mirrors_user() {
        let fixture = Fixture::new().await;
        let uid = fixture.sign_in("ada@example.com", None).await;
        let vm = view_model(&fixture);

        vm.update_profile(" Ada ", Some(b"photo".to_vec())).await;
        assert_eq!(vm.profile_state(), Some(FormState::Success));

        let ui = vm.profile_ui();
        assert_eq!(ui.name, "Ada");
        assert!(ui.photo_url.is_some());

        let cached = vm.cached_user().await.unwrap().unwrap();
        assert_eq!(cached.id, uid);
        assert_eq!(cached.email, "ada@example.com");
        assert_eq!(cached.profile_image_url, ui.photo_url);
    }

    #[tokio::test]
    async fn test_my_events_and_logout() {
        let fixture = Fixture::new().await;
        let uid = fixture.sign_in("ada@example.com", Some("Ada")).await;
        let mut mine = sample_event("mine", "Mar 01, 2026 6:00 AM");
        mine.creator_id = uid;
        fixture.events.create_event(&mine).await.unwrap();
        fixture.events.create_event(&sample_event("theirs", "Mar 02, 2026 6:00 AM")).await.unwrap();

        let vm = view_model(&fixture);
        let ids: Vec<String> = vm.my_events().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["mine"]);
        assert_eq!(vm.profile_ui().name, "Ada");

        vm.logout();
        assert!(vm.my_events().is_empty());
        assert_eq!(vm.profile_ui().name, DEFAULT_PROFILE_NAME);
    }
}
