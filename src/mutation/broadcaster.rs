use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::messages::{ComponentMutation, OutboundMessage};
use crate::publisher::{topics, DeliveryError, Publisher};

/// Publishes component mutations to `project/{id}/components`
///
/// Each call hands the mutation to the publisher exactly once. Ordering
/// across concurrent producers is left to the caller.
pub struct MutationBroadcaster {
    publisher: Arc<dyn Publisher>,
}

impl MutationBroadcaster {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    #[instrument(skip(self, mutation), fields(project_id = mutation.project_id, component_id = mutation.component_id))]
    pub async fn publish_mutation(&self, mutation: ComponentMutation) -> Result<(), DeliveryError> {
        let topic = topics::components(mutation.project_id);
        let kind = mutation.kind;

        match self
            .publisher
            .send_to_topic(&topic, &OutboundMessage::Mutation(mutation))
            .await
        {
            Ok(()) => {
                info!(topic = %topic, kind = %kind, "Component mutation published");
                Ok(())
            }
            Err(e) => {
                error!(topic = %topic, kind = %kind, error = %e, "Component mutation not delivered");
                Err(e)
            }
        }
    }
}
