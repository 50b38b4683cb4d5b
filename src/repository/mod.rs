//! Repositories mediate between the view-models and the backends: the remote
//! document store, object storage, the auth service, the sunrise-sunset API
//! and the local cache.

pub mod auth;
pub mod events;
pub mod storage;
pub mod users;
pub mod weather;

pub use auth::{AuthRepository, AuthResult, LocalAuthRepository};
pub use events::{EventPatch, EventsRepository, EVENTS_COLLECTION};
pub use storage::{LocalObjectStorage, ObjectStorage, StorageRepository};
pub use users::UserRepository;
pub use weather::WeatherRepository;
