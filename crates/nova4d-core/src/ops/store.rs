//! Command queue
//!
//! [`CommandStore`] is the seam the gateway enqueues through.
//! [`InMemoryCommandStore`] is the process-local implementation: dispatch
//! hands out time-boxed leases in priority order, clients report results
//! against those leases, and expired leases go back to the queue on the next
//! dispatch. Completed commands are pruned oldest first once `max_retention`
//! is exceeded.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::coerce::{PRIORITY_MAX, PRIORITY_MIN};
use crate::config::QueueConfig;
use crate::errors::{NovaError, Result};
use crate::model::{Command, CommandStatus, NewCommand};
use crate::{log_op_end, log_op_error, log_op_start};

/// Largest dispatch batch
pub const MAX_DISPATCH_LIMIT: usize = 100;
/// Largest `list_recent` page
pub const MAX_LIST_LIMIT: usize = 500;
/// Largest `retry_failed` batch
pub const MAX_RETRY_LIMIT: usize = 200;

const MAX_LEASE_MS: u64 = 365 * 86_400_000;
const DEFAULT_LIST_LIMIT: usize = 100;
const DEFAULT_RETRY_LIMIT: usize = 20;

/// Destination for admitted commands
///
/// Implementations assign the id and creation time and must serialize their
/// own mutations; callers never observe a half-applied enqueue.
pub trait CommandStore: Send + Sync {
    /// # Errors
    ///
    /// Implementation defined; the in-memory store never fails.
    fn enqueue(&self, command: NewCommand) -> Result<Command>;
}

/// A result reported by a client for a dispatched command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultReport {
    pub command_id: Option<String>,
    pub ok: bool,
    /// `"ok"` (any case) also counts as success
    pub status: Option<String>,
    pub requeue: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl ResultReport {
    pub fn succeeded(command_id: impl Into<String>) -> Self {
        Self {
            command_id: Some(command_id.into()),
            ok: true,
            ..Self::default()
        }
    }

    pub fn failed(command_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            command_id: Some(command_id.into()),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn requeue(command_id: impl Into<String>) -> Self {
        Self {
            command_id: Some(command_id.into()),
            requeue: true,
            ..Self::default()
        }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    fn is_success(&self) -> bool {
        self.ok
            || self
                .status
                .as_deref()
                .is_some_and(|s| s.trim().eq_ignore_ascii_case("ok"))
    }
}

/// Command state after `report_result`
///
/// `ignored` is set when the report arrived for a command that had already
/// reached a terminal status; the command is returned unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultOutcome {
    pub command: Command,
    pub ignored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelSummary {
    pub canceled_count: usize,
    pub command_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrySummary {
    pub requested_limit: usize,
    pub include_canceled: bool,
    pub requeued_count: usize,
    pub command_ids: Vec<String>,
}

/// Cumulative lifecycle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounters {
    pub queued_total: u64,
    pub dispatched_total: u64,
    pub succeeded_total: u64,
    pub failed_total: u64,
    pub canceled_total: u64,
    pub requeued_total: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub queued: usize,
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub canceled: usize,
}

impl StatusCounts {
    fn bump(&mut self, status: CommandStatus) {
        match status {
            CommandStatus::Queued => self.queued += 1,
            CommandStatus::Dispatched => self.dispatched += 1,
            CommandStatus::Succeeded => self.succeeded += 1,
            CommandStatus::Failed => self.failed += 1,
            CommandStatus::Canceled => self.canceled += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub total_commands: usize,
    pub pending_count: usize,
    pub by_status: StatusCounts,
    pub counters: QueueCounters,
    pub lease_ms: u64,
}

/// Highest priority first, then oldest, then first pushed
type PendingKey = (Reverse<i64>, DateTime<Utc>, u64);

/// Ids waiting for dispatch, in dispatch order
#[derive(Debug, Default)]
struct PendingQueue {
    order: BTreeMap<PendingKey, String>,
    keys: HashMap<String, PendingKey>,
    next_seq: u64,
}

impl PendingQueue {
    /// No-op when the command is already waiting
    fn push(&mut self, cmd: &Command) {
        if self.keys.contains_key(&cmd.id) {
            return;
        }
        let key = (Reverse(cmd.priority), cmd.created_at, self.next_seq);
        self.next_seq += 1;
        self.keys.insert(cmd.id.clone(), key);
        self.order.insert(key, cmd.id.clone());
    }

    fn pop_front(&mut self) -> Option<String> {
        let (_, id) = self.order.pop_first()?;
        self.keys.remove(&id);
        Some(id)
    }

    fn remove(&mut self, id: &str) {
        if let Some(key) = self.keys.remove(id) {
            self.order.remove(&key);
        }
    }

    fn drain(&mut self) -> Vec<String> {
        self.keys.clear();
        std::mem::take(&mut self.order).into_values().collect()
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

#[derive(Debug, Default)]
struct QueueState {
    commands: HashMap<String, Command>,
    pending: PendingQueue,
    counters: QueueCounters,
}

impl QueueState {
    fn requeue_expired(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .commands
            .values()
            .filter(|cmd| {
                cmd.status == CommandStatus::Dispatched
                    && cmd.lease_expires_at.is_some_and(|lease| lease <= now)
            })
            .map(|cmd| cmd.id.clone())
            .collect();

        for id in &expired {
            if let Some(cmd) = self.commands.get_mut(id) {
                cmd.status = CommandStatus::Queued;
                cmd.updated_at = now;
                cmd.lease_expires_at = None;
                self.pending.push(cmd);
                self.counters.requeued_total += 1;
            }
        }
        expired.len()
    }

    /// Drop the oldest completed commands until back within `max_retention`
    fn prune(&mut self, max_retention: usize) -> usize {
        if self.commands.len() <= max_retention {
            return 0;
        }
        let mut completed: Vec<(DateTime<Utc>, String)> = self
            .commands
            .values()
            .filter(|cmd| cmd.status.is_terminal())
            .map(|cmd| (cmd.updated_at, cmd.id.clone()))
            .collect();
        completed.sort();

        let excess = self.commands.len() - max_retention;
        let mut removed = 0;
        for (_, id) in completed.into_iter().take(excess) {
            self.commands.remove(&id);
            removed += 1;
        }
        removed
    }

    fn newest_first(&self) -> Vec<&Command> {
        let mut all: Vec<&Command> = self.commands.values().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        all
    }

    fn requeue(&mut self, id: &str, allow_canceled: bool, now: DateTime<Utc>) -> Result<Command> {
        let cmd = self
            .commands
            .get_mut(id)
            .ok_or_else(|| NovaError::CommandNotFound {
                command_id: id.to_string(),
            })?;

        match cmd.status {
            CommandStatus::Queued => return Ok(cmd.clone()),
            CommandStatus::Canceled if !allow_canceled => {
                return Err(NovaError::CommandCanceled {
                    command_id: id.to_string(),
                })
            }
            _ => {}
        }

        cmd.status = CommandStatus::Queued;
        cmd.updated_at = now;
        cmd.lease_expires_at = None;
        cmd.completed_at = None;
        cmd.error = None;
        let snapshot = cmd.clone();
        self.pending.push(&snapshot);
        self.counters.requeued_total += 1;
        Ok(snapshot)
    }
}

fn ms_since(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Process-local command queue
///
/// All state sits behind one mutex, so every operation is atomic with respect
/// to the others. Nothing is persisted.
#[derive(Debug)]
pub struct InMemoryCommandStore {
    config: QueueConfig,
    state: Mutex<QueueState>,
}

impl Default for InMemoryCommandStore {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

impl InMemoryCommandStore {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            state: Mutex::new(QueueState::default()),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // A panic mid-operation leaves plain data behind; keep serving it.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lease(&self) -> Duration {
        let ms = self.config.lease_ms.min(MAX_LEASE_MS);
        Duration::milliseconds(i64::try_from(ms).unwrap_or_default())
    }

    /// Enqueue with an explicit clock reading
    pub fn enqueue_at(&self, input: NewCommand, now: DateTime<Utc>) -> Command {
        let command = Command {
            id: Uuid::now_v7().to_string(),
            route: input.route,
            category: input.category,
            action: input.action,
            payload: input.payload,
            priority: input.priority.clamp(PRIORITY_MIN, PRIORITY_MAX),
            metadata: input.metadata,
            status: CommandStatus::Queued,
            attempts: 0,
            created_at: now,
            updated_at: now,
            dispatched_at: None,
            lease_expires_at: None,
            completed_at: None,
            delivered_to: None,
            result: None,
            error: None,
        };

        let mut state = self.lock();
        state.commands.insert(command.id.clone(), command.clone());
        state.pending.push(&command);
        state.counters.queued_total += 1;
        let pruned = state.prune(self.config.max_retention);
        if pruned > 0 {
            tracing::debug!(pruned, "pruned completed commands");
        }
        command
    }

    pub fn enqueue_batch(&self, items: Vec<NewCommand>) -> Vec<Command> {
        let now = Utc::now();
        items
            .into_iter()
            .map(|item| self.enqueue_at(item, now))
            .collect()
    }

    /// Lease up to `limit` queued commands to `client_id`
    ///
    /// Expired leases are returned to the queue first. `limit` defaults to the
    /// configured dispatch limit and is clamped to `[1, 100]`.
    pub fn dispatch(&self, client_id: &str, limit: Option<usize>) -> Vec<Command> {
        self.dispatch_at(client_id, limit, Utc::now())
    }

    pub fn dispatch_at(
        &self,
        client_id: &str,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Vec<Command> {
        log_op_start!("dispatch", client_id = client_id);
        let start = std::time::Instant::now();

        let max = limit
            .unwrap_or(self.config.dispatch_limit)
            .clamp(1, MAX_DISPATCH_LIMIT);
        let lease_until = now + self.lease();

        let mut state = self.lock();
        let requeued = state.requeue_expired(now);
        let mut out = Vec::new();

        while out.len() < max {
            let Some(id) = state.pending.pop_front() else {
                break;
            };
            let Some(cmd) = state.commands.get_mut(&id) else {
                continue;
            };
            if cmd.status != CommandStatus::Queued {
                continue;
            }
            cmd.status = CommandStatus::Dispatched;
            cmd.delivered_to = Some(client_id.to_string());
            cmd.dispatched_at = Some(now);
            cmd.lease_expires_at = Some(lease_until);
            cmd.updated_at = now;
            cmd.attempts += 1;
            out.push(cmd.clone());
        }
        state.counters.dispatched_total += out.len() as u64;
        drop(state);

        log_op_end!(
            "dispatch",
            duration_ms = ms_since(start),
            dispatched = out.len(),
            requeued_expired = requeued
        );
        out
    }

    /// Apply a client's result report
    ///
    /// # Errors
    ///
    /// `MissingCommandId` when the report names no command, `CommandNotFound`
    /// when the id is unknown.
    pub fn report_result(&self, report: ResultReport) -> Result<ResultOutcome> {
        self.report_result_at(report, Utc::now())
    }

    pub fn report_result_at(
        &self,
        report: ResultReport,
        now: DateTime<Utc>,
    ) -> Result<ResultOutcome> {
        log_op_start!("report_result");
        let start = std::time::Instant::now();

        let result = self.apply_report(report, now);
        match &result {
            Ok(outcome) => {
                log_op_end!(
                    "report_result",
                    duration_ms = ms_since(start),
                    command_id = outcome.command.id.as_str(),
                    status = outcome.command.status.as_str(),
                    ignored = outcome.ignored
                );
            }
            Err(e) => log_op_error!("report_result", e.clone(), duration_ms = ms_since(start)),
        }
        result
    }

    fn apply_report(&self, report: ResultReport, now: DateTime<Utc>) -> Result<ResultOutcome> {
        let id = report
            .command_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or(NovaError::MissingCommandId)?;
        let success = report.is_success();

        let mut state = self.lock();
        let cmd = state
            .commands
            .get_mut(&id)
            .ok_or_else(|| NovaError::CommandNotFound {
                command_id: id.clone(),
            })?;

        let late = match cmd.status {
            CommandStatus::Canceled => true,
            CommandStatus::Succeeded | CommandStatus::Failed => !report.requeue,
            _ => false,
        };
        if late {
            return Ok(ResultOutcome {
                command: cmd.clone(),
                ignored: true,
            });
        }

        cmd.result = report.result;
        cmd.error = report.error;
        cmd.updated_at = now;
        cmd.lease_expires_at = None;

        if report.requeue {
            cmd.status = CommandStatus::Queued;
            let snapshot = cmd.clone();
            state.pending.push(&snapshot);
            state.counters.requeued_total += 1;
            return Ok(ResultOutcome {
                command: snapshot,
                ignored: false,
            });
        }

        cmd.status = if success {
            CommandStatus::Succeeded
        } else {
            CommandStatus::Failed
        };
        cmd.completed_at = Some(now);
        let snapshot = cmd.clone();
        state.pending.remove(&id);
        if success {
            state.counters.succeeded_total += 1;
        } else {
            state.counters.failed_total += 1;
        }
        Ok(ResultOutcome {
            command: snapshot,
            ignored: false,
        })
    }

    /// Cancel one queued or dispatched command
    ///
    /// Canceling an already canceled command returns it unchanged.
    ///
    /// # Errors
    ///
    /// `CommandNotFound`, or `CommandAlreadyCompleted` for succeeded and
    /// failed commands.
    pub fn cancel(&self, id: &str) -> Result<Command> {
        let now = Utc::now();
        let mut state = self.lock();
        let cmd = state
            .commands
            .get_mut(id)
            .ok_or_else(|| NovaError::CommandNotFound {
                command_id: id.to_string(),
            })?;

        match cmd.status {
            CommandStatus::Succeeded | CommandStatus::Failed => {
                return Err(NovaError::CommandAlreadyCompleted {
                    command_id: id.to_string(),
                })
            }
            CommandStatus::Canceled => return Ok(cmd.clone()),
            _ => {}
        }

        cmd.status = CommandStatus::Canceled;
        cmd.updated_at = now;
        cmd.completed_at = Some(now);
        cmd.lease_expires_at = None;
        let snapshot = cmd.clone();
        state.pending.remove(id);
        state.counters.canceled_total += 1;
        Ok(snapshot)
    }

    /// Cancel everything queued or in flight
    ///
    /// Queued commands come first in dispatch order, then dispatched ones
    /// oldest first.
    pub fn cancel_pending(&self) -> CancelSummary {
        let now = Utc::now();
        let mut state = self.lock();
        let state = &mut *state;

        let mut in_flight: Vec<&Command> = state
            .commands
            .values()
            .filter(|cmd| cmd.status == CommandStatus::Dispatched)
            .collect();
        in_flight.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let in_flight: Vec<String> = in_flight.into_iter().map(|cmd| cmd.id.clone()).collect();

        let mut canceled = Vec::new();
        for id in state.pending.drain().into_iter().chain(in_flight) {
            let Some(cmd) = state.commands.get_mut(&id) else {
                continue;
            };
            if !matches!(cmd.status, CommandStatus::Queued | CommandStatus::Dispatched) {
                continue;
            }
            cmd.status = CommandStatus::Canceled;
            cmd.updated_at = now;
            cmd.completed_at = Some(now);
            cmd.lease_expires_at = None;
            canceled.push(id);
        }
        state.counters.canceled_total += canceled.len() as u64;

        CancelSummary {
            canceled_count: canceled.len(),
            command_ids: canceled,
        }
    }

    /// Put a command back in the queue
    ///
    /// Already queued commands are returned unchanged.
    ///
    /// # Errors
    ///
    /// `CommandNotFound`, or `CommandCanceled` when the command is canceled
    /// and `allow_canceled` is false.
    pub fn requeue(&self, id: &str, allow_canceled: bool) -> Result<Command> {
        self.lock().requeue(id, allow_canceled, Utc::now())
    }

    /// Requeue the most recent failed (and optionally canceled) commands
    ///
    /// `limit` defaults to 20 and is clamped to `[1, 200]`; candidates are
    /// drawn from the 500 most recent commands, newest first.
    pub fn retry_failed(&self, limit: Option<usize>, include_canceled: bool) -> RetrySummary {
        let limit = match limit {
            None | Some(0) => DEFAULT_RETRY_LIMIT,
            Some(n) => n.min(MAX_RETRY_LIMIT),
        };
        let now = Utc::now();
        let mut state = self.lock();

        let candidates: Vec<String> = state
            .newest_first()
            .into_iter()
            .take(MAX_LIST_LIMIT)
            .filter(|cmd| {
                cmd.status == CommandStatus::Failed
                    || (include_canceled && cmd.status == CommandStatus::Canceled)
            })
            .take(limit)
            .map(|cmd| cmd.id.clone())
            .collect();

        let requeued: Vec<String> = candidates
            .into_iter()
            .filter_map(|id| state.requeue(&id, include_canceled, now).ok())
            .map(|cmd| cmd.id)
            .collect();

        RetrySummary {
            requested_limit: limit,
            include_canceled,
            requeued_count: requeued.len(),
            command_ids: requeued,
        }
    }

    pub fn get(&self, id: &str) -> Option<Command> {
        self.lock().commands.get(id).cloned()
    }

    /// Newest commands first; `limit` defaults to 100 and is clamped to `[1, 500]`
    pub fn list_recent(&self, limit: Option<usize>) -> Vec<Command> {
        let limit = match limit {
            None | Some(0) => DEFAULT_LIST_LIMIT,
            Some(n) => n.min(MAX_LIST_LIMIT),
        };
        self.lock()
            .newest_first()
            .into_iter()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> StoreSummary {
        let state = self.lock();
        let mut by_status = StatusCounts::default();
        for cmd in state.commands.values() {
            by_status.bump(cmd.status);
        }
        StoreSummary {
            total_commands: state.commands.len(),
            pending_count: state.pending.len(),
            by_status,
            counters: state.counters,
            lease_ms: self.config.lease_ms,
        }
    }
}

impl CommandStore for InMemoryCommandStore {
    fn enqueue(&self, command: NewCommand) -> Result<Command> {
        log_op_start!("enqueue", route = command.route.as_str());
        let start = std::time::Instant::now();

        let command = self.enqueue_at(command, Utc::now());

        log_op_end!(
            "enqueue",
            duration_ms = ms_since(start),
            command_id = command.id.as_str(),
            priority = command.priority
        );
        Ok(command)
    }
}
