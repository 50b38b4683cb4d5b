// SunSeeker Library
// Feed synchronization, local cache and view-model state for sunrise and
// sunset meetups. Screens and backend SDKs sit outside this crate.

pub mod config;
pub mod database;
pub mod error;
pub mod http_config;
pub mod models;
pub mod remote;
pub mod repository;
pub mod sync;
pub mod utils;
pub mod viewmodels;

// Re-export commonly used types
pub use config::AppConfig;
pub use database::Database;
pub use error::{AppError, AppResult};
pub use models::*;
pub use remote::{MemoryDocumentStore, RemoteEventStore};
pub use repository::{
    AuthRepository, EventsRepository, LocalAuthRepository, LocalObjectStorage, StorageRepository, UserRepository,
    WeatherRepository,
};
pub use sync::{run_periodic_refresh, FeedSyncEvent};

use crate::http_config::HttpConfig;
use crate::utils::circuit_breaker::{get_circuit_breaker, SOLAR_API_SERVICE};
use crate::viewmodels::{
    CreateEventViewModel, EventViewModel, FeedViewModel, LoginViewModel, ProfileViewModel, RegisterViewModel,
};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

/// Repositories shared by every screen, wired from an [`AppConfig`].
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub events: Arc<EventsRepository>,
    pub users: UserRepository,
    pub auth: Arc<dyn AuthRepository>,
    pub storage: StorageRepository,
    pub weather: Arc<WeatherRepository>,
    pub refresh_interval: Duration,
    pub shutdown: tokio_util::sync::CancellationToken,
}

impl AppState {
    /// Opens the cache and builds the repositories around `remote`.
    /// Sessions are kept by a [`LocalAuthRepository`] until [`with_auth`](Self::with_auth) swaps it.
    /// Installs the stdout logger unless the embedder already set one.
    pub async fn build(config: &AppConfig, remote: Arc<dyn RemoteEventStore>) -> AppResult<Self> {
        if utils::logging::init_logging().is_err() {
            debug!("Logger already installed, keeping it");
        }
        crate::config::validate_config(config)?;

        let db = Database::new(&config.db_path).await?;
        let storage = StorageRepository::new(Arc::new(LocalObjectStorage::new(&config.storage_dir)));
        let events = Arc::new(EventsRepository::new(db.clone(), remote).await?);
        let breaker = get_circuit_breaker(SOLAR_API_SERVICE).await;
        let weather = Arc::new(WeatherRepository::new(&config.solar_api_url, HttpConfig::solar_api(), breaker)?);

        info!("Application state ready (cache at {})", config.db_path.display());

        Ok(Self {
            users: UserRepository::new(db.clone()),
            auth: Arc::new(LocalAuthRepository::new(storage.clone())),
            db,
            events,
            storage,
            weather,
            refresh_interval: config.refresh_interval,
            shutdown: tokio_util::sync::CancellationToken::new(),
        })
    }

    pub fn with_auth(mut self, auth: Arc<dyn AuthRepository>) -> Self {
        self.auth = auth;
        self
    }

    /// Starts the background feed refresh; it stops when `shutdown` is cancelled.
    pub fn spawn_feed_refresh(&self, sender: Option<Sender<FeedSyncEvent>>) -> JoinHandle<()> {
        tokio::spawn(run_periodic_refresh(
            self.events.clone(),
            self.refresh_interval,
            self.shutdown.clone(),
            sender,
        ))
    }

    pub fn feed_view_model(&self) -> FeedViewModel {
        FeedViewModel::new(self.events.clone(), self.auth.clone())
    }

    pub fn event_view_model(&self) -> EventViewModel {
        EventViewModel::new(self.events.clone(), self.auth.clone())
    }

    pub fn create_event_view_model(&self) -> CreateEventViewModel {
        CreateEventViewModel::new(
            self.events.clone(),
            self.auth.clone(),
            self.storage.clone(),
            self.weather.clone(),
        )
    }

    pub fn profile_view_model(&self) -> ProfileViewModel {
        ProfileViewModel::new(self.events.clone(), self.auth.clone(), self.users.clone())
    }

    pub fn login_view_model(&self) -> LoginViewModel {
        LoginViewModel::new(self.auth.clone())
    }

    pub fn register_view_model(&self) -> RegisterViewModel {
        RegisterViewModel::new(self.auth.clone())
    }
}
