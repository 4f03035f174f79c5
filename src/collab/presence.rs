use std::sync::Arc;
use tracing::{debug, warn};

use crate::messages::{OutboundMessage, PresenceAction, PresenceEvent};
use crate::publisher::{topics, DeliveryError, Publisher};

/// Publishes join/leave events to `project/{id}/presence`
#[derive(Clone)]
pub struct PresenceNotifier {
    publisher: Arc<dyn Publisher>,
}

impl PresenceNotifier {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    pub async fn notify_join(
        &self,
        project_id: i64,
        user_id: &str,
        display_name: &str,
    ) -> Result<(), DeliveryError> {
        self.notify(project_id, user_id, display_name, PresenceAction::Join)
            .await
    }

    pub async fn notify_leave(
        &self,
        project_id: i64,
        user_id: &str,
        display_name: &str,
    ) -> Result<(), DeliveryError> {
        self.notify(project_id, user_id, display_name, PresenceAction::Leave)
            .await
    }

    async fn notify(
        &self,
        project_id: i64,
        user_id: &str,
        display_name: &str,
        action: PresenceAction,
    ) -> Result<(), DeliveryError> {
        let topic = topics::presence(project_id);
        let message = OutboundMessage::Presence(PresenceEvent {
            project_id,
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            action,
        });

        match self.publisher.send_to_topic(&topic, &message).await {
            Ok(()) => {
                debug!(
                    project_id = project_id,
                    user_id = %user_id,
                    action = %action,
                    "Presence notification sent"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    project_id = project_id,
                    user_id = %user_id,
                    action = %action,
                    error = %e,
                    "Presence notification failed"
                );
                Err(e)
            }
        }
    }
}
