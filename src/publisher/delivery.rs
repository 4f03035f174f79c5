use async_trait::async_trait;
use thiserror::Error;

use crate::messages::OutboundMessage;

/// Failure to hand a message to the transport
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    #[error("Channel closed for {0}")]
    ChannelClosed(String),

    #[error("Failed to serialize message: {0}")]
    Serialization(String),

    #[error("Transport rejected message for {0}")]
    Rejected(String),
}

/// Trait for the message bus the core publishes to
///
/// Implementations must be safe for concurrent use by many callers. A
/// returned `Ok` means the message was handed off; redelivery after that
/// point is the transport's concern.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Point-to-point delivery to one addressed user on a logical queue
    async fn send_to_user(
        &self,
        user_id: &str,
        queue: &str,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError>;

    /// Broadcast to every subscriber of a topic
    async fn send_to_topic(
        &self,
        topic: &str,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError>;
}
