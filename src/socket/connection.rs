use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use thiserror::Error;
use tracing::debug;

use super::bridge::Subscription;

/// Minimal socket surface a connection needs
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text frame to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Next text frame from the client, `None` once the client has gone
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

#[derive(Error, Debug)]
pub enum SocketError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
}

#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // Binary and ping/pong frames carry nothing for us
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// A client socket fed by one [`Subscription`]
///
/// Delivery is one-way: text the client sends is logged and dropped.
pub struct Connection {
    socket: Box<dyn SocketWrapper>,
    subscription: Subscription,
}

impl Connection {
    pub fn new(socket: Box<dyn SocketWrapper>, subscription: Subscription) -> Self {
        Self {
            socket,
            subscription,
        }
    }

    /// Pumps frames to the client until either side goes away
    pub async fn run(mut self) -> Result<(), SocketError> {
        let result = self.pump().await;

        self.subscription.close();
        let _ = self.socket.close().await;
        result
    }

    async fn pump(&mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                frame = self.subscription.recv() => {
                    match frame {
                        Some(frame) => self.socket.send_message(frame).await?,
                        None => return Ok(()),
                    }
                }

                inbound = self.socket.receive_message() => {
                    match inbound {
                        Ok(Some(message)) => {
                            debug!(
                                user_id = %self.subscription.user_id(),
                                message = %message,
                                "Ignoring inbound socket message"
                            );
                        }
                        Ok(None) => return Ok(()),
                        Err(e) => return Err(e),
                    }
                }
            }
        }
    }
}
