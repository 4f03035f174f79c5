// Library crate for the collaborative canvas coordination core
// This file exposes the public API for the server binary and integration tests

pub mod collab;
pub mod config;
pub mod directory;
pub mod messages;
pub mod mutation;
pub mod operation;
pub mod publisher;
pub mod routes;
pub mod shared;
pub mod socket;

// Re-export commonly used types for easier access in tests
pub use collab::{ChatRelay, CollaborationSession, SessionRegistry};
pub use config::Config;
pub use messages::{ComponentMutation, OutboundMessage, Phase, PresenceEvent, ProgressEvent};
pub use mutation::MutationBroadcaster;
pub use operation::{OperationHandle, OperationOutcome, OperationRequest, OperationRunner};
pub use publisher::{DeliveryError, InMemoryPublisher, Publisher};
pub use routes::build_router;
pub use shared::{AppError, AppState};
