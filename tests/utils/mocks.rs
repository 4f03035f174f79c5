use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use canvas_collab::socket::{SocketError, SocketFrame, SocketWrapper};
use canvas_collab::{DeliveryError, OutboundMessage, ProgressEvent, Publisher};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Publisher that records everything and can be told to reject sends
#[derive(Clone, Default)]
pub struct MockPublisher {
    /// user_id -> (queue, message)
    user_messages: Arc<RwLock<HashMap<String, Vec<(String, OutboundMessage)>>>>,
    /// topic -> messages
    topic_messages: Arc<RwLock<HashMap<String, Vec<OutboundMessage>>>>,
    fail_users: Arc<AtomicBool>,
    fail_topics: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_users(&self, fail: bool) {
        self.fail_users.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_topics(&self, fail: bool) {
        self.fail_topics.store(fail, Ordering::SeqCst);
    }

    pub async fn get_messages_for(&self, user_id: &str) -> Vec<(String, OutboundMessage)> {
        self.user_messages
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn progress_for(&self, user_id: &str) -> Vec<ProgressEvent> {
        self.get_messages_for(user_id)
            .await
            .iter()
            .filter_map(|(_, message)| message.as_progress().cloned())
            .collect()
    }

    pub async fn get_topic_messages(&self, topic: &str) -> Vec<OutboundMessage> {
        self.topic_messages
            .read()
            .await
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn clear_messages(&self) {
        self.user_messages.write().await.clear();
        self.topic_messages.write().await.clear();
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn send_to_user(
        &self,
        user_id: &str,
        queue: &str,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        if self.fail_users.load(Ordering::SeqCst) {
            return Err(DeliveryError::ChannelClosed(user_id.to_string()));
        }
        self.user_messages
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push((queue.to_string(), message.clone()));
        Ok(())
    }

    async fn send_to_topic(
        &self,
        topic: &str,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        if self.fail_topics.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected(topic.to_string()));
        }
        self.topic_messages
            .write()
            .await
            .entry(topic.to_string())
            .or_default()
            .push(message.clone());
        Ok(())
    }
}

/// Socket stand-in: frames sent to the "client" are captured, and the
/// client can type messages or hang up through [`MockSocketClient`]
pub struct MockSocket {
    sent: Arc<RwLock<Vec<String>>>,
    inbound: mpsc::UnboundedReceiver<String>,
    closed: Arc<AtomicBool>,
}

/// The browser side of a [`MockSocket`]
pub struct MockSocketClient {
    sent: Arc<RwLock<Vec<String>>>,
    outbound: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

impl MockSocket {
    pub fn pair() -> (MockSocket, MockSocketClient) {
        let sent = Arc::new(RwLock::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let (outbound, inbound) = mpsc::unbounded_channel();

        (
            MockSocket {
                sent: sent.clone(),
                inbound,
                closed: closed.clone(),
            },
            MockSocketClient {
                sent,
                outbound,
                closed,
            },
        )
    }
}

#[allow(dead_code)]
impl MockSocketClient {
    pub async fn frames(&self) -> Vec<SocketFrame> {
        self.sent
            .read()
            .await
            .iter()
            .map(|frame| serde_json::from_str(frame).expect("socket frame is JSON"))
            .collect()
    }

    pub fn type_message(&self, text: &str) {
        let _ = self.outbound.send(text.to_string());
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Drops the client's half, which the server sees as a disconnect
    pub fn hang_up(self) -> Arc<AtomicBool> {
        self.closed
    }
}

#[async_trait]
impl SocketWrapper for MockSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.sent.write().await.push(message);
        Ok(())
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        Ok(self.inbound.recv().await)
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
