// Project and user lookups the core needs from external storage

// Public API - what other modules can use
pub use models::{Project, User};
pub use repository::{
    InMemoryProjectRepository, InMemoryUserRepository, ProjectRepository, UserRepository,
};

// Internal modules
mod models;
mod repository;
