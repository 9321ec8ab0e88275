//! In-process broadcast notification channel
//!
//! Implements [`NotificationChannel`] over `tokio::sync::broadcast`, one
//! sender per topic, created lazily on first use. Each subscription bridges
//! a broadcast receiver into the port's mpsc-backed stream through a
//! forwarder task; a subscriber that falls behind loses the overwritten
//! events with a warning and keeps receiving (at-least-once for everyone
//! else, best-effort ordering only).

use async_trait::async_trait;
use courier_application::ports::notification_channel::{
    ChannelError, Notification, NotificationChannel, NotificationStream,
};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

const DEFAULT_CAPACITY: usize = 64;

/// Topic-keyed broadcast [`NotificationChannel`].
pub struct BroadcastChannel {
    capacity: usize,
    topics: Mutex<HashMap<String, broadcast::Sender<Notification>>>,
}

impl BroadcastChannel {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Channel with a custom per-topic buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: Mutex::new(HashMap::new()),
        }
    }

    fn sender_for(&self, topic: &str) -> Result<broadcast::Sender<Notification>, String> {
        let mut topics = self
            .topics
            .lock()
            .map_err(|_| "topic registry poisoned".to_string())?;
        Ok(topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone())
    }
}

impl Default for BroadcastChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationChannel for BroadcastChannel {
    async fn publish(&self, topic: &str, notification: Notification) -> Result<(), ChannelError> {
        let sender = self.sender_for(topic).map_err(ChannelError::PublishFailed)?;
        // send() errs only when no subscriber is connected, which is fine:
        // the event is simply unobserved.
        match sender.send(notification) {
            Ok(receivers) => debug!(topic, receivers, "Notification published"),
            Err(_) => debug!(topic, "Notification published with no subscribers"),
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<NotificationStream, ChannelError> {
        let sender = self.sender_for(topic).map_err(ChannelError::SubscribeFailed)?;
        let mut source = sender.subscribe();
        let (tx, rx) = mpsc::channel(self.capacity);

        let topic = topic.to_string();
        tokio::spawn(async move {
            loop {
                match source.recv().await {
                    Ok(notification) => {
                        if tx.send(notification).await.is_err() {
                            // Subscriber closed its stream
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(topic = %topic, skipped, "Subscriber lagging, notifications dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(NotificationStream::new(rx))
    }
}
