//! Broadcast of notifications to listeners.
//!
//! Publishing never blocks and never fails: with no listener attached the
//! notification is simply dropped. A listener that falls more than the
//! channel capacity behind receives [`broadcast::error::RecvError::Lagged`]
//! and skips to the newest notification.

use tokio::sync::broadcast;
use tracing::debug;

use hrs_types::Notification;

/// Default capacity of the notification channel.
pub const DEFAULT_CAPACITY: usize = 256;

/// Fan-out point for [`Notification`]s.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    /// Create a hub whose channel holds up to `capacity` notifications.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Attach a new listener. It receives notifications published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Send `notification` to every listener. Returns how many received it.
    pub fn publish(&self, notification: Notification) -> usize {
        let kind = notification.kind();
        let delivered = self.tx.send(notification).unwrap_or(0);
        debug!(kind, delivered, "Notification published");
        delivered
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
