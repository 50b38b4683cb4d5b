use crate::models::RefreshResult;
use crate::repository::EventsRepository;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedSyncEvent {
    Refreshed { events_cached: usize },
    Error(String),
}

impl From<RefreshResult> for FeedSyncEvent {
    fn from(result: RefreshResult) -> Self {
        if result.success {
            FeedSyncEvent::Refreshed {
                events_cached: result.events_cached,
            }
        } else {
            FeedSyncEvent::Error(result.error_message.unwrap_or_default())
        }
    }
}

/// Refreshes the feed cache every `interval` until `shutdown` fires.
///
/// The first refresh runs immediately. Failures are logged and reported on
/// `sender` but never end the loop.
pub async fn run_periodic_refresh(
    events: Arc<EventsRepository>,
    interval: Duration,
    shutdown: CancellationToken,
    sender: Option<Sender<FeedSyncEvent>>,
) {
    info!("Starting feed refresh loop (every {:?})", interval);

    loop {
        if shutdown.is_cancelled() {
            info!("Shutdown signal received, stopping feed refresh loop");
            break;
        }

        let result = tokio::select! {
            result = events.refresh_events() => match result {
                Ok(result) => {
                    debug!("Feed refresh cycle completed");
                    result
                }
                Err(e) => {
                    error!("Feed refresh failed: {}", e);
                    RefreshResult::with_error(e.to_safe_string())
                }
            },
            _ = shutdown.cancelled() => {
                info!("Shutdown signal received during refresh, stopping feed refresh loop");
                break;
            }
        };
        if let Some(tx) = &sender {
            let _ = tx.send(FeedSyncEvent::from(result)).await;
        }

        tokio::select! {
            _ = sleep(interval) => {}
            _ = shutdown.cancelled() => {
                info!("Shutdown signal received during sleep, stopping feed refresh loop");
                break;
            }
        }
    }

    info!("Feed refresh loop stopped gracefully");
}
