use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::models::{CollaborationSession, Participant};
use super::presence::PresenceNotifier;
use crate::directory::ProjectRepository;
use crate::shared::AppError;

/// Result of a join request
#[derive(Debug, Clone)]
enum JoinOutcome {
    /// No session was active, a new one was opened
    Created(CollaborationSession),
    /// Added to the active session
    Joined(CollaborationSession),
    /// Already a participant, nothing changed
    AlreadyPresent(CollaborationSession),
}

impl JoinOutcome {
    fn into_session(self) -> CollaborationSession {
        match self {
            JoinOutcome::Created(s) | JoinOutcome::Joined(s) | JoinOutcome::AlreadyPresent(s) => s,
        }
    }
}

/// Result of a leave request
#[derive(Debug, Clone)]
enum LeaveOutcome {
    /// Removed, others remain
    Left {
        session: CollaborationSession,
        participant: Participant,
    },
    /// Removed the last participant; the session is now inactive
    Deactivated {
        session: CollaborationSession,
        participant: Participant,
    },
    NotParticipant,
    NoActiveSession,
}

/// Every session a project has had, at most one of them active
#[derive(Debug, Default)]
struct ProjectSessions {
    sessions: Vec<CollaborationSession>,
}

impl ProjectSessions {
    fn active(&self) -> Option<&CollaborationSession> {
        self.sessions.iter().find(|s| s.active)
    }

    fn active_mut(&mut self) -> Option<&mut CollaborationSession> {
        self.sessions.iter_mut().find(|s| s.active)
    }

    fn join(&mut self, project_id: i64, project_name: &str, participant: Participant) -> JoinOutcome {
        if let Some(session) = self.active_mut() {
            if session.add_participant(participant) {
                return JoinOutcome::Joined(session.clone());
            }
            return JoinOutcome::AlreadyPresent(session.clone());
        }

        let session = CollaborationSession::open(project_id, project_name, participant);
        self.sessions.push(session.clone());
        JoinOutcome::Created(session)
    }

    fn leave(&mut self, user_id: &str) -> LeaveOutcome {
        let Some(session) = self.active_mut() else {
            return LeaveOutcome::NoActiveSession;
        };

        match session.remove_participant(user_id) {
            Some(participant) if session.active => LeaveOutcome::Left {
                session: session.clone(),
                participant,
            },
            Some(participant) => LeaveOutcome::Deactivated {
                session: session.clone(),
                participant,
            },
            None => LeaveOutcome::NotParticipant,
        }
    }
}

/// Tracks active collaboration sessions and their participants per project
///
/// Each project has its own slot behind an async mutex, so join, leave and
/// lookups for one project are serialized while other projects proceed in
/// parallel. Presence events are published while the slot is held, which
/// keeps them in transition order for that project.
///
/// Nothing is ever evicted: a project's slot and every session it has had,
/// deactivated ones included, live for the lifetime of the registry so
/// `sessions` can return the full history. One inactive session is added
/// per "last participant left" cycle.
pub struct SessionRegistry {
    projects: Arc<dyn ProjectRepository + Send + Sync>,
    presence: PresenceNotifier,
    /// project_id -> sessions of that project
    slots: RwLock<HashMap<i64, Arc<Mutex<ProjectSessions>>>>,
}

impl SessionRegistry {
    pub fn new(
        projects: Arc<dyn ProjectRepository + Send + Sync>,
        presence: PresenceNotifier,
    ) -> Self {
        Self {
            projects,
            presence,
            slots: RwLock::new(HashMap::new()),
        }
    }

    async fn slot(&self, project_id: i64) -> Arc<Mutex<ProjectSessions>> {
        let slots = self.slots.read().await;

        if let Some(slot) = slots.get(&project_id) {
            return slot.clone();
        }
        drop(slots);

        let mut slots = self.slots.write().await;
        slots.entry(project_id).or_default().clone()
    }

    /// Adds a user to the project's active session, opening one if needed
    #[instrument(skip(self))]
    pub async fn join(
        &self,
        project_id: i64,
        user_id: &str,
        display_name: &str,
    ) -> Result<CollaborationSession, AppError> {
        info!(project_id = project_id, user_id = %user_id, "User joining session");

        let project = self.projects.require_project(project_id).await?;
        let slot = self.slot(project_id).await;
        let mut sessions = slot.lock().await;

        let participant = Participant {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
        };
        let outcome = sessions.join(project_id, &project.name, participant);

        let changed = match &outcome {
            JoinOutcome::Created(session) => {
                info!(
                    project_id = project_id,
                    session_id = %session.id,
                    "New collaboration session created"
                );
                true
            }
            JoinOutcome::Joined(session) => {
                info!(
                    project_id = project_id,
                    session_id = %session.id,
                    participant_count = session.participant_count(),
                    "User added to existing session"
                );
                true
            }
            JoinOutcome::AlreadyPresent(session) => {
                debug!(
                    project_id = project_id,
                    session_id = %session.id,
                    user_id = %user_id,
                    "User already in session"
                );
                false
            }
        };

        if !changed {
            return Ok(outcome.into_session());
        }

        if let Err(e) = self
            .presence
            .notify_join(project_id, user_id, display_name)
            .await
        {
            warn!(
                project_id = project_id,
                user_id = %user_id,
                error = %e,
                "Join recorded but presence event was not delivered"
            );
        }

        Ok(outcome.into_session())
    }

    /// Removes a user from the project's active session; unknown users are ignored
    #[instrument(skip(self))]
    pub async fn leave(&self, project_id: i64, user_id: &str) -> Result<(), AppError> {
        info!(project_id = project_id, user_id = %user_id, "User leaving session");

        self.projects.require_project(project_id).await?;
        let slot = self.slot(project_id).await;
        let mut sessions = slot.lock().await;

        let participant = match sessions.leave(user_id) {
            LeaveOutcome::Left {
                session,
                participant,
            } => {
                info!(
                    project_id = project_id,
                    session_id = %session.id,
                    participant_count = session.participant_count(),
                    "User left session"
                );
                participant
            }
            LeaveOutcome::Deactivated {
                session,
                participant,
            } => {
                info!(
                    project_id = project_id,
                    session_id = %session.id,
                    "Session deactivated - no participants left"
                );
                participant
            }
            LeaveOutcome::NotParticipant => {
                debug!(project_id = project_id, user_id = %user_id, "User was not in session");
                return Ok(());
            }
            LeaveOutcome::NoActiveSession => {
                debug!(project_id = project_id, "No active session to leave");
                return Ok(());
            }
        };

        if let Err(e) = self
            .presence
            .notify_leave(project_id, user_id, &participant.display_name)
            .await
        {
            warn!(
                project_id = project_id,
                user_id = %user_id,
                error = %e,
                "Leave recorded but presence event was not delivered"
            );
        }

        Ok(())
    }

    /// The project's active session, if any
    #[instrument(skip(self))]
    pub async fn active_session(
        &self,
        project_id: i64,
    ) -> Result<Option<CollaborationSession>, AppError> {
        self.projects.require_project(project_id).await?;
        let slot = self.slot(project_id).await;
        let sessions = slot.lock().await;
        Ok(sessions.active().cloned())
    }

    /// All sessions the project has had, oldest first
    #[instrument(skip(self))]
    pub async fn sessions(&self, project_id: i64) -> Result<Vec<CollaborationSession>, AppError> {
        self.projects.require_project(project_id).await?;
        let slot = self.slot(project_id).await;
        let sessions = slot.lock().await;
        Ok(sessions.sessions.clone())
    }
}
