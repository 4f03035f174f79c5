// Collaboration sessions: who is editing which project, and what they say

// Public API - what other modules can use
pub use chat::ChatRelay;
pub use handlers::{active_session, join_session, leave_session, list_sessions, send_chat};
pub use models::{CollaborationSession, Participant};
pub use presence::PresenceNotifier;
pub use registry::SessionRegistry;

// Internal modules
mod chat;
mod handlers;
mod models;
mod presence;
mod registry;
mod types;
