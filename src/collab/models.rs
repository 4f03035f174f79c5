use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user present in a session; identity itself lives in the user store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: String,
    pub display_name: String,
}

/// A collaboration context binding a project to its present participants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationSession {
    pub id: Uuid,
    pub project_id: i64,
    pub session_name: String,
    /// Unique by user id; order carries no meaning
    pub participants: Vec<Participant>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CollaborationSession {
    /// Opens a new active session with its first participant
    pub fn open(project_id: i64, project_name: &str, first: Participant) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            project_id,
            session_name: format!("Collaboration Session - {}", project_name),
            participants: vec![first],
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Adds a participant; returns false when they were already present
    pub fn add_participant(&mut self, participant: Participant) -> bool {
        if self.has_participant(&participant.user_id) {
            return false;
        }
        self.participants.push(participant);
        self.touch();
        true
    }

    /// Removes a participant, deactivating the session when it empties
    pub fn remove_participant(&mut self, user_id: &str) -> Option<Participant> {
        let index = self.participants.iter().position(|p| p.user_id == user_id)?;
        let removed = self.participants.remove(index);

        if self.participants.is_empty() {
            self.active = false;
        }
        self.touch();

        Some(removed)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
