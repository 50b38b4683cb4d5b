// file: src/models/state.rs
//! Observable states published by the view-models.

use super::solar::SolarData;

/// Outcome of a one-shot action such as join, leave or delete.
#[derive(Debug, Clone, PartialEq)]
pub enum UiState {
    Loading,
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Idle,
    Error(String),
}

/// Submission state of a form: login, registration, event editor, profile.
#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Loading,
    Success,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolarState {
    Loading,
    Success(SolarData),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUi {
    pub name: String,
    pub photo_url: Option<String>,
}
