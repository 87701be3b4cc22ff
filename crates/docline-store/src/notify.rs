use docline_types::{Change, DocumentId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::NotificationSink;

/// The payload published after a successful update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub document: DocumentId,
    pub version: u64,
    pub changes: Vec<Change>,
}

/// A broadcast channel receiver for change notifications.
pub type NotificationStream = broadcast::Receiver<ChangeNotification>;

/// Fan-out sink backed by a tokio broadcast channel.
///
/// Publishing never blocks. With no subscribers the notification is dropped.
/// Slow subscribers that fall more than `capacity` notifications behind
/// observe a lag error on their next receive.
pub struct BroadcastSink {
    sender: broadcast::Sender<ChangeNotification>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> NotificationStream {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, notification: ChangeNotification) -> StoreResult<()> {
        let document = notification.document;
        let version = notification.version;
        match self.sender.send(notification) {
            Ok(delivered) => debug!(%document, version, delivered, "published changes"),
            Err(_) => debug!(%document, version, "no subscribers for changes"),
        }
        Ok(())
    }
}

/// Sink that discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpSink;

impl NotificationSink for NoOpSink {
    fn publish(&self, _notification: ChangeNotification) -> StoreResult<()> {
        Ok(())
    }
}
