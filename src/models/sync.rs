// file: src/models/sync.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one pull-and-replace cycle of the feed cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResult {
    pub success: bool,
    pub events_cached: usize,
    pub documents_skipped: usize,
    pub error_message: Option<String>,
    pub sync_time: DateTime<Utc>,
}

impl RefreshResult {
    pub fn with_counts(events_cached: usize, documents_skipped: usize) -> Self {
        Self {
            success: true,
            events_cached,
            documents_skipped,
            error_message: None,
            sync_time: Utc::now(),
        }
    }

    pub fn with_error(error: String) -> Self {
        Self {
            success: false,
            events_cached: 0,
            documents_skipped: 0,
            error_message: Some(error),
            sync_time: Utc::now(),
        }
    }
}
