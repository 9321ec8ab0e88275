//! Notification channel port
//!
//! At-least-once publish/subscribe transport carrying completion events
//! from the dispatcher to subscribed clients. All events travel on a single
//! well-known topic; receivers filter by session id.

use async_trait::async_trait;
use courier_domain::{MessageId, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Topic every completion event is published on.
pub const DEFAULT_TOPIC: &str = "default/channel";

/// Errors that can occur on the notification channel
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Subscribe failed: {0}")]
    SubscribeFailed(String),
}

/// Completion event announced when a dispatch finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: MessageId,
    pub session_id: SessionId,
    pub answer: String,
}

/// Handle for receiving notifications from one subscription.
///
/// Wraps an `mpsc::Receiver<Notification>`. A client holds exactly one open
/// subscription per session lifetime and must [`close`](Self::close) it (or
/// drop the handle) to release the underlying connection.
pub struct NotificationStream {
    receiver: mpsc::Receiver<Notification>,
}

impl NotificationStream {
    pub fn new(receiver: mpsc::Receiver<Notification>) -> Self {
        Self { receiver }
    }

    /// Receive the next notification; `None` once the subscription ends.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.receiver.recv().await
    }

    /// Close the subscription. Buffered notifications may still be
    /// received; no new ones arrive.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

/// Publish/subscribe transport for completion events.
///
/// Delivery is at-least-once with no ordering guarantee across sessions;
/// within one session ordering is best-effort only, so receivers must
/// tolerate out-of-order events in principle.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Publish an event to a topic. Publishing with no subscribers is not
    /// an error.
    async fn publish(&self, topic: &str, notification: Notification) -> Result<(), ChannelError>;

    /// Open a subscription to a topic.
    async fn subscribe(&self, topic: &str) -> Result<NotificationStream, ChannelError>;
}
