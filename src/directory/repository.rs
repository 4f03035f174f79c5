use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::{Project, User};
use crate::shared::AppError;

/// Trait for project lookups
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn find_project_by_id(&self, project_id: i64) -> Result<Option<Project>, AppError>;

    /// Convenience for callers that treat a missing project as an error
    async fn require_project(&self, project_id: i64) -> Result<Project, AppError> {
        self.find_project_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project not found: {}", project_id)))
    }
}

/// Trait for user lookups
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError>;

    async fn require_user(&self, user_id: &str) -> Result<User, AppError> {
        self.find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {}", user_id)))
    }
}

/// In-memory implementation of ProjectRepository for development and testing
#[derive(Default)]
pub struct InMemoryProjectRepository {
    projects: RwLock<HashMap<i64, Project>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        Self {
            projects: RwLock::new(projects.into_iter().map(|p| (p.id, p)).collect()),
        }
    }

    pub async fn save_project(&self, project: Project) {
        debug!(project_id = project.id, "Saving project in memory");
        self.projects.write().await.insert(project.id, project);
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    #[instrument(skip(self))]
    async fn find_project_by_id(&self, project_id: i64) -> Result<Option<Project>, AppError> {
        let project = self.projects.read().await.get(&project_id).cloned();

        if project.is_none() {
            debug!(project_id = project_id, "Project not found in memory");
        }

        Ok(project)
    }
}

/// In-memory implementation of UserRepository for development and testing
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }

    pub async fn save_user(&self, user: User) {
        debug!(user_id = %user.id, "Saving user in memory");
        self.users.write().await.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self))]
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let user = self.users.read().await.get(user_id).cloned();

        if user.is_none() {
            debug!(user_id = %user_id, "User not found in memory");
        }

        Ok(user)
    }
}
