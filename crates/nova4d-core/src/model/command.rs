use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::field_map::{Metadata, Payload};

/// Lifecycle status of a queued command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Queued,
    Dispatched,
    Succeeded,
    Failed,
    Canceled,
}

impl CommandStatus {
    pub const ALL: [CommandStatus; 5] = [
        CommandStatus::Queued,
        CommandStatus::Dispatched,
        CommandStatus::Succeeded,
        CommandStatus::Failed,
        CommandStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Queued => "queued",
            CommandStatus::Dispatched => "dispatched",
            CommandStatus::Succeeded => "succeeded",
            CommandStatus::Failed => "failed",
            CommandStatus::Canceled => "canceled",
        }
    }

    /// Succeeded, failed and canceled commands never run again on their own
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CommandStatus::Succeeded | CommandStatus::Failed | CommandStatus::Canceled
        )
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command accepted into the queue
///
/// `id` is assigned by the store on enqueue and never changes afterwards.
/// `priority` is always within `[-100, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    pub route: String,
    pub category: String,
    pub action: String,
    pub payload: Payload,
    pub priority: i64,
    pub metadata: Metadata,
    pub status: CommandStatus,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub delivered_to: Option<String>,
    pub result: Option<Value>,
    pub error: Option<String>,
}

/// Input to [`crate::ops::store::CommandStore::enqueue`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewCommand {
    pub route: String,
    pub category: String,
    pub action: String,
    pub payload: Payload,
    pub priority: i64,
    pub metadata: Metadata,
}

/// A not-yet-persisted command proposed by a planner
///
/// This is what the guard stage inspects: it has a route and payload but no
/// identity, status or timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandCandidate {
    pub route: String,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl CommandCandidate {
    pub fn new(route: impl Into<String>, payload: Payload) -> Self {
        Self {
            route: route.into(),
            payload,
            reason: None,
            priority: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}
