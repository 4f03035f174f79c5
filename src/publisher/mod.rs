// Outbound delivery seam of the core
//
// Every component that emits events talks to a `Publisher`; the in-memory
// implementation backs the single-process server and the integration tests.

// Public API - what other modules can use
pub use delivery::{DeliveryError, Publisher};
pub use in_memory::{InMemoryPublisher, UserFrame};

// Internal modules
mod delivery;
mod in_memory;
pub mod topics;
