use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::publisher::{InMemoryPublisher, UserFrame};

/// What a socket client receives for every published message
///
/// `destination` is `/user/queue/{queue}` for point-to-point traffic and
/// `/topic/{topic}` for broadcasts; `payload` is the published JSON as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketFrame {
    pub destination: String,
    pub payload: serde_json::Value,
}

impl SocketFrame {
    pub fn user_destination(queue: &str) -> String {
        format!("/user/queue/{}", queue)
    }

    pub fn topic_destination(topic: &str) -> String {
        format!("/topic/{}", topic)
    }

    /// Wraps a published body; `None` if either side is not valid JSON
    fn encode(destination: String, body: &str) -> Option<String> {
        let payload = match serde_json::from_str(body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(destination = %destination, error = %e, "Dropping unparseable published body");
                return None;
            }
        };

        serde_json::to_string(&SocketFrame {
            destination,
            payload,
        })
        .map_err(|e| warn!(error = %e, "Failed to encode socket frame"))
        .ok()
    }
}

/// One client's merged view of its user queue and the topics it asked for
///
/// Every source is drained by its own forwarder task into a single channel,
/// so frames from one source keep their publish order.
pub struct Subscription {
    user_id: String,
    outbound: mpsc::UnboundedReceiver<String>,
    forwarders: Vec<JoinHandle<()>>,
}

impl Subscription {
    /// Connects `user_id` on the hub and subscribes to each topic
    ///
    /// Registration is complete when this returns; anything published
    /// afterwards is delivered.
    pub async fn open(hub: &InMemoryPublisher, user_id: &str, topics: &[String]) -> Self {
        let (sender, outbound) = mpsc::unbounded_channel();
        let mut forwarders = Vec::with_capacity(topics.len() + 1);

        let user_receiver = hub.connect_user(user_id).await;
        forwarders.push(tokio::spawn(forward_user(user_receiver, sender.clone())));

        for topic in topics {
            let receiver = hub.subscribe(topic).await;
            forwarders.push(tokio::spawn(forward_topic(
                topic.clone(),
                receiver,
                sender.clone(),
            )));
        }

        debug!(user_id = %user_id, topics = ?topics, "Socket subscription opened");

        Self {
            user_id: user_id.to_string(),
            outbound,
            forwarders,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Next encoded frame; `None` once every source has ended
    pub async fn recv(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Stops every forwarder, dropping the underlying receivers
    pub fn close(&mut self) {
        for forwarder in self.forwarders.drain(..) {
            forwarder.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

async fn forward_user(
    mut receiver: mpsc::UnboundedReceiver<UserFrame>,
    sender: mpsc::UnboundedSender<String>,
) {
    while let Some(UserFrame { queue, body }) = receiver.recv().await {
        let Some(frame) = SocketFrame::encode(SocketFrame::user_destination(&queue), &body) else {
            continue;
        };
        if sender.send(frame).is_err() {
            break;
        }
    }
}

async fn forward_topic(
    topic: String,
    mut receiver: broadcast::Receiver<String>,
    sender: mpsc::UnboundedSender<String>,
) {
    loop {
        match receiver.recv().await {
            Ok(body) => {
                let Some(frame) = SocketFrame::encode(SocketFrame::topic_destination(&topic), &body)
                else {
                    continue;
                };
                if sender.send(frame).is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(topic = %topic, skipped = skipped, "Socket client fell behind on topic");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
