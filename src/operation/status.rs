use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::messages::{OperationStatus, OutboundMessage, StatusNotification};
use crate::publisher::{topics, DeliveryError, Publisher};

/// Broadcasts coarse STARTED / PROCESSING / DONE notifications
///
/// Unlike [`super::OperationRunner`], nothing here is addressed to a user;
/// every notification goes to the shared `notifications` topic.
pub struct ProcessSimulator {
    publisher: Arc<dyn Publisher>,
    /// Pause between simulated stages
    delay: Duration,
}

impl ProcessSimulator {
    pub fn new(publisher: Arc<dyn Publisher>, delay: Duration) -> Self {
        Self { publisher, delay }
    }

    /// Publishes one status notification, filling in the default text for a blank message
    #[instrument(skip(self, message))]
    pub async fn notify(
        &self,
        status: OperationStatus,
        message: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let notification = StatusNotification::new(status, message);
        let result = self
            .publisher
            .send_to_topic(
                topics::NOTIFICATIONS_TOPIC,
                &OutboundMessage::Status(notification),
            )
            .await;

        match &result {
            Ok(()) => debug!(status = %status, "Status notification published"),
            Err(e) => warn!(status = %status, error = %e, "Status notification not delivered"),
        }

        result
    }

    /// Runs the three-stage process in the background
    pub fn simulate(self: &Arc<Self>) -> JoinHandle<()> {
        let simulator = Arc::clone(self);

        tokio::spawn(async move {
            info!(delay_ms = simulator.delay.as_millis() as u64, "Simulated process started");

            for (stage, status) in OperationStatus::iter().enumerate() {
                if stage > 0 {
                    tokio::time::sleep(simulator.delay).await;
                }
                // Failures are already logged by notify; the process keeps going
                let _ = simulator.notify(status, None).await;
            }

            info!("Simulated process finished");
        })
    }
}
