//! Notification listener task.
//!
//! Logs every notification the organization publishes as a JSON payload.
//! The task ends when the organization, and with it the last sender, is
//! dropped.

use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use hrs_types::Notification;

/// Drain `rx` until the channel closes. Returns the number of notifications
/// logged.
pub async fn run(mut rx: Receiver<Notification>) -> u64 {
    let mut logged: u64 = 0;
    loop {
        match rx.recv().await {
            Ok(notification) => {
                match serde_json::to_string(&notification) {
                    Ok(payload) => info!(kind = notification.kind(), %payload, "Notification"),
                    Err(e) => warn!(
                        kind = notification.kind(),
                        error = %e,
                        "failed to serialize notification"
                    ),
                }
                logged = logged.saturating_add(1);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Notification listener lagged, skipping ahead");
            }
            Err(RecvError::Closed) => break,
        }
    }
    info!(logged, "Notification listener stopped");
    logged
}
