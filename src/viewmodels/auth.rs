use crate::models::FormState;
use crate::repository::AuthRepository;
use log::warn;
use std::sync::Arc;
use tokio::sync::watch;

pub struct LoginViewModel {
    auth: Arc<dyn AuthRepository>,
    state: watch::Sender<Option<FormState>>,
}

impl LoginViewModel {
    pub fn new(auth: Arc<dyn AuthRepository>) -> Self {
        Self { auth, state: watch::channel(None).0 }
    }

    pub fn state(&self) -> Option<FormState> {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<Option<FormState>> {
        self.state.subscribe()
    }

    pub async fn login(&self, email: &str, password: &str) {
        self.state.send_replace(Some(FormState::Loading));
        let result = self.auth.login(email.trim(), password).await;
        let next = if result.is_success {
            FormState::Success
        } else {
            FormState::Error(result.error_message.unwrap_or_else(|| "Login failed".to_string()))
        };
        self.state.send_replace(Some(next));
    }

    pub fn is_user_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }
}

pub struct RegisterViewModel {
    auth: Arc<dyn AuthRepository>,
    state: watch::Sender<Option<FormState>>,
}

impl RegisterViewModel {
    pub fn new(auth: Arc<dyn AuthRepository>) -> Self {
        Self { auth, state: watch::channel(None).0 }
    }

    pub fn state(&self) -> Option<FormState> {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<Option<FormState>> {
        self.state.subscribe()
    }

    /// Creates the account, then sets its profile. The account exists once
    /// registration succeeds, so a failed profile update still reports success.
    pub async fn register(&self, email: &str, password: &str, display_name: &str, photo: Option<Vec<u8>>) {
        self.state.send_replace(Some(FormState::Loading));

        let result = self.auth.register(email.trim(), password).await;
        if !result.is_success {
            let message = result
                .error_message
                .unwrap_or_else(|| "Registration failed".to_string());
            self.state.send_replace(Some(FormState::Error(message)));
            return;
        }

        if let Err(e) = self.auth.update_profile(display_name.trim(), photo).await {
            warn!("Registered but profile update failed: {}", e);
        }
        self.state.send_replace(Some(FormState::Success));
    }
}
