// Fan-out of component changes to project observers

// Public API - what other modules can use
pub use broadcaster::MutationBroadcaster;
pub use handlers::publish_mutation;

// Internal modules
mod broadcaster;
mod handlers;
