//! Authentication seam
//!
//! The view-models only see [`AuthRepository`]. [`LocalAuthRepository`] keeps
//! accounts in memory and is used for offline runs and tests.

use crate::error::{AppError, AppResult};
use crate::repository::storage::StorageRepository;
use crate::utils::{is_valid_email, logging};
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub is_success: bool,
    pub error_message: Option<String>,
}

impl AuthResult {
    pub fn success() -> Self {
        Self { is_success: true, error_message: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { is_success: false, error_message: Some(message.into()) }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Signs in. A successful login replaces any current session.
    async fn login(&self, email: &str, password: &str) -> AuthResult;

    /// Creates an account and signs into it.
    async fn register(&self, email: &str, password: &str) -> AuthResult;

    fn logout(&self);

    fn current_user_id(&self) -> Option<String>;

    fn current_display_name(&self) -> Option<String>;

    fn current_photo_url(&self) -> Option<String>;

    fn current_email(&self) -> Option<String>;

    fn is_logged_in(&self) -> bool {
        self.current_user_id().is_some()
    }

    /// Sets the display name and, when `photo` is given, uploads it and uses
    /// its URL as the profile photo.
    async fn update_profile(&self, display_name: &str, photo: Option<Vec<u8>>) -> AppResult<()>;
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Default)]
struct Sessions {
    // keyed by lowercased email
    accounts: HashMap<String, Account>,
    current: Option<String>,
}

impl Sessions {
    fn current_account(&self) -> Option<&Account> {
        self.current.as_ref().and_then(|email| self.accounts.get(email))
    }
}

pub struct LocalAuthRepository {
    storage: StorageRepository,
    sessions: RwLock<Sessions>,
}

impl LocalAuthRepository {
    pub fn new(storage: StorageRepository) -> Self {
        Self { storage, sessions: RwLock::new(Sessions::default()) }
    }

    fn read(&self) -> RwLockReadGuard<'_, Sessions> {
        self.sessions.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Sessions> {
        self.sessions.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthRepository for LocalAuthRepository {
    async fn login(&self, email: &str, password: &str) -> AuthResult {
        let key = account_key(email);
        let mut sessions = self.write();

        let matches = sessions
            .accounts
            .get(&key)
            .map(|account| account.password == password)
            .unwrap_or(false);
        if !matches {
            debug!("Rejected login for {}", key);
            return AuthResult::failure("The email or password is incorrect");
        }

        sessions.current = Some(key.clone());
        logging::log_auth_event("Login", &key);
        AuthResult::success()
    }

    async fn register(&self, email: &str, password: &str) -> AuthResult {
        if !is_valid_email(email) {
            return AuthResult::failure("The email address is badly formatted");
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return AuthResult::failure(format!(
                "Password should be at least {} characters",
                MIN_PASSWORD_LEN
            ));
        }

        let key = account_key(email);
        let mut sessions = self.write();
        if sessions.accounts.contains_key(&key) {
            return AuthResult::failure("The email address is already in use by another account");
        }

        sessions.accounts.insert(
            key.clone(),
            Account {
                uid: Uuid::new_v4().to_string(),
                password: password.to_string(),
                display_name: None,
                photo_url: None,
            },
        );
        sessions.current = Some(key.clone());
        logging::log_auth_event("Registration", &key);
        AuthResult::success()
    }

    fn logout(&self) {
        if let Some(email) = self.write().current.take() {
            logging::log_auth_event("Logout", &email);
        }
    }

    fn current_user_id(&self) -> Option<String> {
        self.read().current_account().map(|account| account.uid.clone())
    }

    fn current_display_name(&self) -> Option<String> {
        self.read().current_account().and_then(|account| account.display_name.clone())
    }

    fn current_photo_url(&self) -> Option<String> {
        self.read().current_account().and_then(|account| account.photo_url.clone())
    }

    fn current_email(&self) -> Option<String> {
        self.read().current.clone()
    }

    async fn update_profile(&self, display_name: &str, photo: Option<Vec<u8>>) -> AppResult<()> {
        let (email, uid) = {
            let sessions = self.read();
            let account = sessions
                .current_account()
                .ok_or_else(|| AppError::auth("Not logged in"))?;
            (sessions.current.clone().unwrap_or_default(), account.uid.clone())
        };

        // Upload before taking the write lock; the guard cannot cross an await
        let photo_url = match photo {
            Some(bytes) => Some(self.storage.upload_profile_image(&uid, &bytes).await?),
            None => None,
        };

        let mut sessions = self.write();
        let account = sessions
            .accounts
            .get_mut(&email)
            .filter(|account| account.uid == uid)
            .ok_or_else(|| AppError::auth("Not logged in"))?;
        account.display_name = Some(display_name.trim().to_string());
        if photo_url.is_some() {
            account.photo_url = photo_url;
        }

        logging::log_auth_event("Profile update", &email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::storage::LocalObjectStorage;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn repository(dir: &TempDir) -> LocalAuthRepository {
        LocalAuthRepository::new(StorageRepository::new(Arc::new(LocalObjectStorage::new(dir.path()))))
    }

    #[tokio::test]
    async fn test_register_signs_in() {
        let dir = TempDir::new().unwrap();
        let auth = repository(&dir);
        assert!(!auth.is_logged_in());

        let result = auth.register("ada@example.com", "sunrise").await;
        assert_eq!(result, AuthResult::success());
        assert!(auth.is_logged_in());
        assert_eq!(auth.current_email().as_deref(), Some("ada@example.com"));
        assert!(auth.current_display_name().is_none());
    }

    #[tokio::test]
    async fn test_register_validation() {
        let dir = TempDir::new().unwrap();
        let auth = repository(&dir);

        assert!(!auth.register("not-an-email", "sunrise").await.is_success);
        assert!(!auth.register("ada@example.com", "short").await.is_success);

        assert!(auth.register("ada@example.com", "sunrise").await.is_success);
        let duplicate = auth.register("ADA@example.com", "another").await;
        assert!(!duplicate.is_success);
        assert!(duplicate.error_message.unwrap().contains("already in use"));
    }

    #[tokio::test]
    async fn test_login_logout() {
        let dir = TempDir::new().unwrap();
        let auth = repository(&dir);
        auth.register("ada@example.com", "sunrise").await;
        let uid = auth.current_user_id().unwrap();
        auth.logout();
        assert!(auth.current_user_id().is_none());

        assert!(!auth.login("ada@example.com", "wrong!").await.is_success);
        assert!(!auth.is_logged_in());

        assert!(auth.login(" ada@example.com ", "sunrise").await.is_success);
        assert_eq!(auth.current_user_id(), Some(uid));
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let dir = TempDir::new().unwrap();
        let auth = repository(&dir);
        let result = auth.update_profile("Ada", None).await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_update_profile_with_photo() {
        let dir = TempDir::new().unwrap();
        let auth = repository(&dir);
        auth.register("ada@example.com", "sunrise").await;

        auth.update_profile("  Ada  ", Some(b"photo".to_vec())).await.unwrap();
        assert_eq!(auth.current_display_name().as_deref(), Some("Ada"));
        let photo = auth.current_photo_url().unwrap();
        assert!(photo.contains("/profiles/"));

        // No new photo keeps the old one
        auth.update_profile("Ada L.", None).await.unwrap();
        assert_eq!(auth.current_photo_url(), Some(photo));
    }
}
