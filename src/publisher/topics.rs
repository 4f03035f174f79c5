//! Topic and queue names shared with dashboards and clients.

/// Per-user queue carrying an operation's progress events
pub const PROGRESS_QUEUE: &str = "progress";

/// Broadcast topic for operation start/completion
pub const SYSTEM_TOPIC: &str = "system";

/// Broadcast topic of the process simulator
pub const NOTIFICATIONS_TOPIC: &str = "notifications";

pub fn components(project_id: i64) -> String {
    format!("project/{}/components", project_id)
}

pub fn presence(project_id: i64) -> String {
    format!("project/{}/presence", project_id)
}

pub fn chat(project_id: i64) -> String {
    format!("project/{}/chat", project_id)
}
