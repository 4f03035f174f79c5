// Websocket delivery of publisher traffic to browser clients

// Public API
pub use bridge::{SocketFrame, Subscription};
pub use connection::{Connection, SocketError, SocketWrapper};
pub use handler::{websocket_handler, SocketQuery};

// Internal modules
mod bridge;
mod connection;
mod handler;
