//! Bookkeeping for out-of-band headless jobs
//!
//! The store only records what an external runner reports: it never spawns,
//! signals or times out a process itself. Memory is bounded by [`prune_jobs`],
//! which callers invoke explicitly (typically right after each insert).
//!
//! [`prune_jobs`]: HeadlessJobStore::prune_jobs

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::config::HeadlessConfig;
use crate::errors::{NovaError, Result};
use crate::model::{HeadlessJob, JobStatus};
use crate::{log_op_end, log_op_error, log_op_start};

/// Exit code recorded for jobs terminated by the runner
pub const FORCED_EXIT_CODE: i32 = -1;

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 500;

#[derive(Debug)]
pub struct HeadlessJobStore {
    config: HeadlessConfig,
    jobs: Mutex<HashMap<String, HeadlessJob>>,
}

impl Default for HeadlessJobStore {
    fn default() -> Self {
        Self::from_config(&HeadlessConfig::default())
    }
}

impl HeadlessJobStore {
    /// Store that prunes down to `keep_size` once it holds more than `max_size`
    pub fn new(max_size: usize, keep_size: usize) -> Self {
        Self::from_config(&HeadlessConfig {
            max_jobs: max_size,
            keep_jobs: keep_size,
            ..HeadlessConfig::default()
        })
    }

    pub fn from_config(config: &HeadlessConfig) -> Self {
        Self {
            config: config.clone(),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, HeadlessJob>> {
        self.jobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update<F>(&self, job_id: &str, apply: F) -> Result<HeadlessJob>
    where
        F: FnOnce(&mut HeadlessJob) -> Result<()>,
    {
        let mut jobs = self.lock();
        let job = jobs.get_mut(job_id).ok_or_else(|| NovaError::JobNotFound {
            job_id: job_id.to_string(),
        })?;
        apply(job)?;
        Ok(job.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Register a new running job
    ///
    /// `timeout_sec` starts at the configured default until the runner
    /// reports its own through [`attach_process`](Self::attach_process).
    pub fn create_job_record(
        &self,
        command: impl Into<String>,
        args: Vec<String>,
        log_path: impl Into<String>,
    ) -> HeadlessJob {
        self.create_job_record_at(command, args, log_path, Utc::now())
    }

    pub fn create_job_record_at(
        &self,
        command: impl Into<String>,
        args: Vec<String>,
        log_path: impl Into<String>,
        now: DateTime<Utc>,
    ) -> HeadlessJob {
        let job = HeadlessJob {
            id: Uuid::now_v7().to_string(),
            status: JobStatus::Running,
            command: command.into(),
            args,
            log_path: log_path.into(),
            created_at: now,
            updated_at: now,
            started_at: now,
            completed_at: None,
            exit_code: None,
            signal: None,
            pid: None,
            timeout_sec: Some(self.config.resolve_timeout_sec(None)),
            output_path: None,
            error: None,
        };
        log_op_start!("create_job_record", job_id = job.id.as_str());
        let start = std::time::Instant::now();

        self.lock().insert(job.id.clone(), job.clone());

        log_op_end!(
            "create_job_record",
            duration_ms = start.elapsed().as_millis() as u64,
            job_id = job.id.as_str(),
            command = job.command.as_str()
        );
        job
    }

    /// Record the runner's process id and the timeout it enforces
    ///
    /// `timeout_sec` is read loosely and clamped to `[30, 86400]`; a missing
    /// or unreadable value keeps the configured default.
    ///
    /// # Errors
    ///
    /// `JobNotFound` for unknown ids.
    pub fn attach_process(
        &self,
        job_id: &str,
        pid: Option<u32>,
        timeout_sec: Option<&Value>,
    ) -> Result<HeadlessJob> {
        let timeout_sec = self.config.resolve_timeout_sec(timeout_sec);
        self.update(job_id, |job| {
            job.pid = pid;
            job.timeout_sec = Some(timeout_sec);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// `JobNotFound` for unknown ids.
    pub fn set_output_path(
        &self,
        job_id: &str,
        output_path: impl Into<String>,
    ) -> Result<HeadlessJob> {
        let output_path = output_path.into();
        self.update(job_id, |job| {
            job.output_path = Some(output_path);
            Ok(())
        })
    }

    /// Move a job to its terminal status
    ///
    /// A second call overwrites the first; the caller owns the job and must
    /// finalize it once.
    ///
    /// # Errors
    ///
    /// `JobNotFound` for unknown ids.
    pub fn finalize_job(
        &self,
        job_id: &str,
        status: JobStatus,
        exit_code: Option<i32>,
        signal: Option<&str>,
    ) -> Result<HeadlessJob> {
        self.finalize_job_at(job_id, status, exit_code, signal, Utc::now())
    }

    pub fn finalize_job_at(
        &self,
        job_id: &str,
        status: JobStatus,
        exit_code: Option<i32>,
        signal: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<HeadlessJob> {
        log_op_start!("finalize_job", job_id = job_id, status = status.as_str());
        let start = std::time::Instant::now();

        let job = self.update(job_id, |job| {
            if job.status.is_terminal() {
                tracing::warn!(
                    job_id,
                    previous = job.status.as_str(),
                    next = status.as_str(),
                    "job finalized twice"
                );
            }
            mark_finished(job, status, exit_code, signal, now);
            Ok(())
        });

        match &job {
            Ok(job) => {
                log_op_end!(
                    "finalize_job",
                    duration_ms = start.elapsed().as_millis() as u64,
                    job_id = job_id,
                    status = job.status.as_str()
                );
            }
            Err(e) => log_op_error!(
                "finalize_job",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            ),
        }
        job
    }

    /// Cancel a running job on behalf of the runner
    ///
    /// # Errors
    ///
    /// `JobNotFound` for unknown ids, `JobNotRunning` when the job already
    /// reached a terminal status.
    pub fn cancel_job(&self, job_id: &str) -> Result<HeadlessJob> {
        let now = Utc::now();
        let job = self.update(job_id, |job| {
            if job.status != JobStatus::Running {
                return Err(NovaError::JobNotRunning {
                    job_id: job_id.to_string(),
                    status: job.status.to_string(),
                });
            }
            mark_finished(
                job,
                JobStatus::Canceled,
                Some(FORCED_EXIT_CODE),
                Some("SIGTERM"),
                now,
            );
            Ok(())
        })?;
        tracing::info!(job_id, "job canceled");
        Ok(job)
    }

    /// Attach a runner error message
    ///
    /// # Errors
    ///
    /// `JobNotFound` for unknown ids.
    pub fn record_error(&self, job_id: &str, message: impl Into<String>) -> Result<HeadlessJob> {
        let message = message.into();
        self.update(job_id, |job| {
            job.error = Some(message);
            job.updated_at = Utc::now();
            Ok(())
        })
    }

    pub fn get(&self, job_id: &str) -> Option<HeadlessJob> {
        self.lock().get(job_id).cloned()
    }

    /// Newest jobs first; `limit` defaults to 50 and is clamped to `[1, 500]`
    pub fn list_recent(&self, limit: Option<usize>) -> Vec<HeadlessJob> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let mut jobs: Vec<HeadlessJob> = self.lock().values().cloned().collect();
        sort_newest_first(&mut jobs);
        jobs.truncate(limit);
        jobs
    }

    /// Compact the store once it exceeds its size threshold
    ///
    /// Keeps the `keep_size` most recently created jobs and returns how many
    /// were removed. Running jobs get no special treatment.
    pub fn prune_jobs(&self) -> usize {
        let mut jobs = self.lock();
        if jobs.len() <= self.config.max_jobs {
            return 0;
        }
        log_op_start!("prune_jobs", size = jobs.len());
        let start = std::time::Instant::now();

        let mut ranked: Vec<(DateTime<Utc>, String)> = jobs
            .values()
            .map(|job| (job.created_at, job.id.clone()))
            .collect();
        ranked.sort_by(|a, b| b.cmp(a));

        let before = jobs.len();
        for (_, id) in ranked.into_iter().skip(self.config.keep_jobs) {
            jobs.remove(&id);
        }
        let removed = before - jobs.len();

        log_op_end!(
            "prune_jobs",
            duration_ms = start.elapsed().as_millis() as u64,
            removed_len = removed
        );
        removed
    }
}

fn mark_finished(
    job: &mut HeadlessJob,
    status: JobStatus,
    exit_code: Option<i32>,
    signal: Option<&str>,
    now: DateTime<Utc>,
) {
    job.status = status;
    job.exit_code = exit_code;
    job.signal = signal.map(str::to_string);
    job.completed_at = Some(now);
    job.updated_at = now;
}

fn sort_newest_first(jobs: &mut [HeadlessJob]) {
    jobs.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sets_running_with_equal_timestamps() {
        let store = HeadlessJobStore::default();
        let job = store.create_job_record("c4d", vec!["-nogui".to_string()], "/tmp/job.log");

        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.created_at, job.started_at);
        assert_eq!(job.created_at, job.updated_at);
        assert!(job.completed_at.is_none());
        assert_eq!(job.timeout_sec, Some(1800));
        assert_eq!(store.get(&job.id), Some(job));
    }

    #[test]
    fn test_configured_timeout_is_stamped_on_new_jobs() {
        let store = HeadlessJobStore::from_config(&HeadlessConfig {
            default_timeout_sec: 600,
            ..HeadlessConfig::default()
        });
        let job = store.create_job_record("c4d", Vec::new(), "/tmp/job.log");
        assert_eq!(job.timeout_sec, Some(600));

        let job = store
            .attach_process(&job.id, Some(7), Some(&serde_json::json!("later")))
            .unwrap();
        assert_eq!(job.timeout_sec, Some(600));

        let job = store
            .attach_process(&job.id, Some(7), Some(&serde_json::json!(5)))
            .unwrap();
        assert_eq!(job.timeout_sec, Some(30));
    }

    #[test]
    fn test_cancel_only_running() {
        let store = HeadlessJobStore::default();
        let job = store.create_job_record("c4d", Vec::new(), "/tmp/job.log");

        let canceled = store.cancel_job(&job.id).unwrap();
        assert_eq!(canceled.status, JobStatus::Canceled);
        assert_eq!(canceled.exit_code, Some(-1));
        assert_eq!(canceled.signal.as_deref(), Some("SIGTERM"));

        let err = store.cancel_job(&job.id).unwrap_err();
        assert_eq!(err.to_string(), format!("job {} is canceled", job.id));
    }

    #[test]
    fn test_unknown_job() {
        let store = HeadlessJobStore::default();
        assert!(matches!(
            store.record_error("missing", "boom"),
            Err(NovaError::JobNotFound { .. })
        ));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_prune_is_noop_within_threshold() {
        let store = HeadlessJobStore::new(3, 1);
        for _ in 0..3 {
            store.create_job_record("c4d", Vec::new(), "/tmp/job.log");
        }
        assert_eq!(store.prune_jobs(), 0);
        assert_eq!(store.len(), 3);
    }
}
