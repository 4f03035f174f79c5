use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::directory::{ProjectRepository, UserRepository};
use crate::messages::{ChatMessage, ChatMessageType, OutboundMessage};
use crate::publisher::{topics, Publisher};
use crate::shared::AppError;

/// Relays chat lines to `project/{id}/chat`
pub struct ChatRelay {
    publisher: Arc<dyn Publisher>,
    projects: Arc<dyn ProjectRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl ChatRelay {
    pub fn new(
        publisher: Arc<dyn Publisher>,
        projects: Arc<dyn ProjectRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            publisher,
            projects,
            users,
        }
    }

    #[instrument(skip(self, message))]
    pub async fn send_chat_message(
        &self,
        project_id: i64,
        user_id: &str,
        message: &str,
    ) -> Result<ChatMessage, AppError> {
        self.projects.require_project(project_id).await?;
        let user = self.users.require_user(user_id).await?;

        let chat = ChatMessage {
            project_id,
            user_id: user.id,
            username: user.username,
            message: message.to_string(),
            timestamp: Utc::now(),
            message_type: ChatMessageType::Text,
        };

        self.publisher
            .send_to_topic(&topics::chat(project_id), &OutboundMessage::Chat(chat.clone()))
            .await?;

        info!(project_id = project_id, user_id = %user_id, "Chat message sent");
        Ok(chat)
    }
}
