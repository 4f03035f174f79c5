use std::sync::Arc;

use canvas_collab::{
    directory::{InMemoryProjectRepository, InMemoryUserRepository, Project, User},
    operation::{NoDelayExecutor, StepExecutor},
    AppState, Config, Publisher,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup<P> {
    pub state: AppState,
    pub publisher: Arc<P>,
}

pub struct TestSetupBuilder {
    projects: Vec<Project>,
    users: Vec<User>,
    step_executor: Arc<dyn StepExecutor>,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            projects: vec![],
            users: vec![],
            step_executor: Arc::new(NoDelayExecutor),
        }
    }

    pub fn with_project(mut self, id: i64, name: &str) -> Self {
        self.projects.push(Project::new(id, name, "alice"));
        self
    }

    pub fn with_user(mut self, id: &str, username: &str) -> Self {
        self.users.push(User::new(id, username));
        self
    }

    /// Project 1 "Demo Canvas" and project 2 "Sandbox", users alice and bob
    pub fn with_demo_directory(self) -> Self {
        self.with_project(1, "Demo Canvas")
            .with_project(2, "Sandbox")
            .with_user("alice", "Alice")
            .with_user("bob", "Bob")
    }

    pub fn with_step_executor(mut self, step_executor: Arc<dyn StepExecutor>) -> Self {
        self.step_executor = step_executor;
        self
    }

    pub fn build<P: Publisher + 'static>(self, publisher: Arc<P>) -> TestSetup<P> {
        let projects = Arc::new(InMemoryProjectRepository::with_projects(self.projects));
        let users = Arc::new(InMemoryUserRepository::with_users(self.users));

        let state = AppState::new(Config::default(), publisher.clone(), projects, users)
            .with_step_executor(self.step_executor);

        TestSetup { state, publisher }
    }
}
