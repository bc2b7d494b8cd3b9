use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of an out-of-band headless job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Succeeded,
    Failed,
    Canceled,
    TimedOut,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
            JobStatus::TimedOut => "timed_out",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookkeeping record for one headless job
///
/// Created `running` with `created_at == started_at == updated_at`; moves to a
/// terminal status through `finalize_job`, which sets `completed_at`.
/// `timeout_sec` is informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlessJob {
    pub id: String,
    pub status: JobStatus,
    pub command: String,
    pub args: Vec<String>,
    pub log_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub exit_code: Option<i32>,
    pub signal: Option<String>,
    pub pid: Option<u32>,
    pub timeout_sec: Option<u64>,
    pub output_path: Option<String>,
    pub error: Option<String>,
}
