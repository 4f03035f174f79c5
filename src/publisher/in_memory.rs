use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, warn};

use super::delivery::{DeliveryError, Publisher};
use crate::messages::OutboundMessage;

/// A serialized message addressed to one user
#[derive(Debug, Clone, PartialEq)]
pub struct UserFrame {
    pub queue: String,
    pub body: String,
}

/// Single-process publisher: a broadcast channel per topic, an unbounded
/// channel per connected user
#[derive(Debug, Clone)]
pub struct InMemoryPublisher {
    /// topic -> sender
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
    /// user_id -> sender
    users: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<UserFrame>>>>,
    topic_capacity: usize,
}

impl InMemoryPublisher {
    pub fn new(topic_capacity: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            topic_capacity,
        }
    }

    /// Subscribe to a topic, creating its channel on first use
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<String> {
        let topics = self.topics.read().await;

        if let Some(sender) = topics.get(topic) {
            sender.subscribe()
        } else {
            debug!(topic = %topic, "Creating new topic channel for subscription");
            drop(topics);

            let mut topics = self.topics.write().await;
            // Another subscriber may have raced us between the two locks
            let sender = topics
                .entry(topic.to_string())
                .or_insert_with(|| broadcast::channel(self.topic_capacity).0);
            sender.subscribe()
        }
    }

    /// Register a user's connection; replaces any previous one
    pub async fn connect_user(&self, user_id: &str) -> mpsc::UnboundedReceiver<UserFrame> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut users = self.users.write().await;
        if users.insert(user_id.to_string(), sender).is_some() {
            debug!(user_id = %user_id, "Replaced existing user connection");
        }
        receiver
    }

    pub async fn disconnect_user(&self, user_id: &str) {
        let mut users = self.users.write().await;
        users.remove(user_id);
    }

    fn serialize(message: &OutboundMessage) -> Result<String, DeliveryError> {
        serde_json::to_string(message).map_err(|e| DeliveryError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl Publisher for InMemoryPublisher {
    async fn send_to_user(
        &self,
        user_id: &str,
        queue: &str,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        let body = Self::serialize(message)?;
        let users = self.users.read().await;

        let Some(sender) = users.get(user_id) else {
            debug!(
                user_id = %user_id,
                queue = %queue,
                kind = message.kind(),
                "User has no active connection"
            );
            return Ok(());
        };

        let frame = UserFrame {
            queue: queue.to_string(),
            body,
        };

        if sender.send(frame).is_err() {
            drop(users);
            warn!(user_id = %user_id, "User connection closed, removing it");
            self.users.write().await.remove(user_id);
            return Err(DeliveryError::ChannelClosed(user_id.to_string()));
        }

        Ok(())
    }

    async fn send_to_topic(
        &self,
        topic: &str,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        let body = Self::serialize(message)?;
        let topics = self.topics.read().await;

        match topics.get(topic).map(|sender| sender.send(body)) {
            Some(Ok(receiver_count)) => {
                debug!(
                    topic = %topic,
                    receivers = receiver_count,
                    kind = message.kind(),
                    "Topic message published"
                );
            }
            Some(Err(_)) | None => {
                debug!(topic = %topic, kind = message.kind(), "Topic message published with no receivers");
            }
        }

        Ok(())
    }
}
