use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Lifecycle stage of an operation's progress stream
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Started,
    Progressing,
    Completed,
    Error,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Error)
    }
}

/// One progress record of an operation, delivered to its owner and to `system`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub operation_id: String,
    pub user_id: String,
    pub phase: Phase,
    /// Absent on ERROR
    pub percentage: Option<u8>,
    pub step_label: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Move,
}

/// A change to one canvas component, produced by the component-editing service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMutation {
    pub component_id: i64,
    pub project_id: i64,
    pub acting_user_id: String,
    pub kind: MutationKind,
    /// Component fields (type, data, position, size) as the editor sent them
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceAction {
    Join,
    Leave,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEvent {
    pub project_id: i64,
    pub user_id: String,
    pub display_name: String,
    pub action: PresenceAction,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatMessageType {
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub project_id: i64,
    pub user_id: String,
    pub username: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub message_type: ChatMessageType,
}

/// Coarse status of the simulated process feed, in the order a process reports them
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Started,
    Processing,
    Done,
}

impl OperationStatus {
    pub fn default_message(&self) -> &'static str {
        match self {
            OperationStatus::Started => "Operation started",
            OperationStatus::Processing => "Processing...",
            OperationStatus::Done => "Operation finished",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusNotification {
    pub step: OperationStatus,
    pub message: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl StatusNotification {
    /// Builds a notification, using the status's default text for a missing or blank message
    pub fn new(step: OperationStatus, message: Option<&str>) -> Self {
        let message = match message {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ => step.default_message().to_string(),
        };

        Self {
            step,
            message,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Everything the core hands to a [`Publisher`](crate::publisher::Publisher)
///
/// Serializes as the bare payload so subscribers see the same JSON the
/// individual payload types produce.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OutboundMessage {
    Progress(ProgressEvent),
    Mutation(ComponentMutation),
    Presence(PresenceEvent),
    Chat(ChatMessage),
    Status(StatusNotification),
}

impl OutboundMessage {
    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::Progress(_) => "progress",
            OutboundMessage::Mutation(_) => "mutation",
            OutboundMessage::Presence(_) => "presence",
            OutboundMessage::Chat(_) => "chat",
            OutboundMessage::Status(_) => "status",
        }
    }

    pub fn as_progress(&self) -> Option<&ProgressEvent> {
        match self {
            OutboundMessage::Progress(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_mutation(&self) -> Option<&ComponentMutation> {
        match self {
            OutboundMessage::Mutation(mutation) => Some(mutation),
            _ => None,
        }
    }

    pub fn as_presence(&self) -> Option<&PresenceEvent> {
        match self {
            OutboundMessage::Presence(event) => Some(event),
            _ => None,
        }
    }
}
