// file: src/models/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: String, name: String, email: String, profile_image_url: Option<String>) -> Self {
        Self {
            id,
            name,
            email,
            profile_image_url,
            updated_at: Utc::now(),
        }
    }
}
