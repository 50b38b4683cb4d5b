//! State holders behind each screen.
//!
//! Every view-model publishes its state on `tokio::sync::watch` channels:
//! `subscribe` for change notifications, plain getters for the latest value.
//! Actions are async and return once their final state has been published.

pub mod auth;
pub mod create_event;
pub mod event_detail;
pub mod feed;
pub mod profile;

pub use auth::{LoginViewModel, RegisterViewModel};
pub use create_event::{CreateEventViewModel, EventForm};
pub use event_detail::EventViewModel;
pub use feed::FeedViewModel;
pub use profile::ProfileViewModel;
