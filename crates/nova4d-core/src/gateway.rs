//! Command admission gateway
//!
//! Single commands go through [`CommandGateway::queue_command`]: route
//! resolution, priority clamping, metadata stamping, payload merge, schema
//! validation, then exactly one enqueue. Pre-built candidate lists (planner
//! output) go through [`CommandGateway::apply_command_guards`], which
//! re-validates every candidate before handing the survivors to the safety
//! filter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nova4d_core_types::RequestContext;
use serde::Serialize;
use serde_json::Value;

use crate::coerce::{clamp_priority, PRIORITY_MAX, PRIORITY_MIN};
use crate::errors::{NovaError, Result};
use crate::model::{Command, CommandCandidate, CommandStatus, Metadata, NewCommand, Payload};
use crate::ops::CommandStore;
use crate::policy::{
    normalize_safety_policy, BlockedCommand, PolicySafetyFilter, RiskClassifier,
    RouteRiskClassifier, SafetyFilter, SafetyInput, SafetyPolicy,
};
use crate::routes::RouteRegistry;
use crate::rules::{PayloadValidator, RuleValidator, ValidationReport};
use crate::{log_op_end, log_op_error, log_op_start};

/// Reason attached to candidates rejected by schema validation
pub const VALIDATION_FAILED_REASON: &str = "payload validation failed";

/// Longest planner reason copied into command metadata
const MAX_REASON_CHARS: usize = 800;
/// Metadata key carrying a queued candidate's reason
pub const REASON_METADATA_KEY: &str = "assistant_reason";

/// A loosely typed queue request as received from a transport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueRequest {
    pub priority: Option<Value>,
    pub metadata: Metadata,
    pub client_hint: Option<Value>,
    pub payload: Payload,
}

impl QueueRequest {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            ..Self::default()
        }
    }

    /// Split a request body into its parts
    ///
    /// The whole body doubles as the payload, so `priority`, `metadata` and
    /// `client_hint` stay visible to the validator. Non-object bodies are
    /// treated as empty.
    pub fn from_body(body: &Value) -> Self {
        let payload = Payload::from_value(Some(body));
        Self {
            priority: payload.get("priority").cloned(),
            metadata: Metadata::from_value(payload.get("metadata")),
            client_hint: payload.get("client_hint").cloned(),
            payload,
        }
    }

    pub fn with_priority(mut self, priority: impl Into<Value>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_client_hint(mut self, client_hint: impl Into<Value>) -> Self {
        self.client_hint = Some(client_hint.into());
        self
    }
}

/// Acknowledgement for an admitted command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueAck {
    pub command_id: String,
    pub category: String,
    pub action: String,
    pub route: String,
    pub queued_at: DateTime<Utc>,
}

/// Wire form of a `queue_command` outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueueResponse {
    Queued(QueueAck),
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        route: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Vec<String>>,
    },
}

impl From<Result<QueueAck>> for QueueResponse {
    fn from(result: Result<QueueAck>) -> Self {
        match result {
            Ok(ack) => QueueResponse::Queued(ack),
            Err(NovaError::RouteNotFound { .. }) => QueueResponse::Error {
                error: "route spec not found".to_string(),
                route: None,
                details: None,
            },
            Err(NovaError::ValidationFailed { route, errors }) => QueueResponse::Error {
                error: VALIDATION_FAILED_REASON.to_string(),
                route: Some(route),
                details: Some(errors),
            },
            Err(other) => QueueResponse::Error {
                error: other.to_string(),
                route: None,
                details: None,
            },
        }
    }
}

/// Outcome of the two-stage guard
///
/// `blocked` lists safety rejections first (filter order), then validation
/// rejections (candidate order).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardResult {
    pub policy: SafetyPolicy,
    pub allowed: Vec<CommandCandidate>,
    pub blocked: Vec<BlockedCommand>,
}

/// Anything able to guard a candidate list
///
/// Implemented by [`CommandGateway`]; the planner depends only on this.
pub trait CommandGuard {
    fn apply_command_guards(
        &self,
        commands: Vec<CommandCandidate>,
        safety: &SafetyInput,
    ) -> GuardResult;
}

impl<T: CommandGuard + ?Sized> CommandGuard for &T {
    fn apply_command_guards(
        &self,
        commands: Vec<CommandCandidate>,
        safety: &SafetyInput,
    ) -> GuardResult {
        (**self).apply_command_guards(commands, safety)
    }
}

impl<T: CommandGuard + ?Sized> CommandGuard for Arc<T> {
    fn apply_command_guards(
        &self,
        commands: Vec<CommandCandidate>,
        safety: &SafetyInput,
    ) -> GuardResult {
        (**self).apply_command_guards(commands, safety)
    }
}

/// Summary of one command queued from a guarded plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedCommand {
    pub id: String,
    pub route: String,
    pub action: String,
    pub status: CommandStatus,
    pub queued_at: DateTime<Utc>,
}

impl From<&Command> for QueuedCommand {
    fn from(command: &Command) -> Self {
        Self {
            id: command.id.clone(),
            route: command.route.clone(),
            action: command.action.clone(),
            status: command.status,
            queued_at: command.created_at,
        }
    }
}

fn ms_since(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// JS-style truthiness for loosely typed hints
fn truthy(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(v) => Some(v.clone()),
    }
}

pub struct CommandGateway {
    routes: Arc<RouteRegistry>,
    validator: Arc<dyn PayloadValidator>,
    safety: Arc<dyn SafetyFilter>,
    classifier: Arc<dyn RiskClassifier>,
    store: Arc<dyn CommandStore>,
}

impl CommandGateway {
    /// Gateway over the built-in routes, rule validator and policy filter
    pub fn new(store: Arc<dyn CommandStore>) -> Self {
        Self {
            routes: Arc::new(RouteRegistry::builtin()),
            validator: Arc::new(RuleValidator),
            safety: Arc::new(PolicySafetyFilter),
            classifier: Arc::new(RouteRiskClassifier),
            store,
        }
    }

    pub fn with_routes(mut self, routes: Arc<RouteRegistry>) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn PayloadValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_safety_filter(mut self, safety: Arc<dyn SafetyFilter>) -> Self {
        self.safety = safety;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn RiskClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn routes(&self) -> &RouteRegistry {
        &self.routes
    }

    pub fn validate_queued_payload(&self, route: &str, payload: &Payload) -> ValidationReport {
        self.validator.validate(route, payload)
    }

    /// Admit one command
    ///
    /// `extra_payload` carries server-computed fields and wins over the
    /// request payload key for key.
    ///
    /// # Errors
    ///
    /// `RouteNotFound` for unregistered routes, `ValidationFailed` with the
    /// validator's messages, or whatever the store reports. The store is
    /// touched only when admission succeeds.
    pub fn queue_command(
        &self,
        route: &str,
        request: QueueRequest,
        extra_payload: Payload,
        ctx: &RequestContext,
    ) -> Result<QueueAck> {
        log_op_start!(
            "queue_command",
            route = route,
            request_id = ctx.request_id.as_str()
        );
        let start = std::time::Instant::now();

        let result = self.admit(route, request, extra_payload, ctx);
        match &result {
            Ok(ack) => {
                log_op_end!(
                    "queue_command",
                    duration_ms = ms_since(start),
                    route = route,
                    command_id = ack.command_id.as_str(),
                    request_id = ctx.request_id.as_str()
                );
            }
            Err(e) => log_op_error!(
                "queue_command",
                e.clone(),
                duration_ms = ms_since(start),
                route = route,
                request_id = ctx.request_id.as_str()
            ),
        }
        result
    }

    fn admit(
        &self,
        route: &str,
        request: QueueRequest,
        extra_payload: Payload,
        ctx: &RequestContext,
    ) -> Result<QueueAck> {
        let spec = *self.routes.resolve(route)?;
        let priority = clamp_priority(request.priority.as_ref());

        let mut metadata = request.metadata;
        metadata.insert("requested_by", ctx.requested_by());
        metadata.insert(
            "client_hint",
            truthy(request.client_hint.as_ref()).unwrap_or(Value::Null),
        );

        let mut payload = request.payload;
        payload.merge(extra_payload);

        let report = self.validate_queued_payload(spec.path, &payload);
        if !report.ok {
            return Err(NovaError::ValidationFailed {
                route: spec.path.to_string(),
                errors: report.errors,
            });
        }

        let command = self.store.enqueue(NewCommand {
            route: spec.path.to_string(),
            category: spec.category.to_string(),
            action: spec.action.to_string(),
            payload,
            priority,
            metadata,
        })?;

        Ok(QueueAck {
            command_id: command.id,
            category: command.category,
            action: command.action,
            route: command.route,
            queued_at: command.created_at,
        })
    }

    /// Queue the allowed commands of a guarded plan
    ///
    /// Candidates whose route is not registered are skipped. Each command's
    /// metadata records the caller, the client hint and the planner's reason.
    ///
    /// # Errors
    ///
    /// Propagates the first store failure; commands queued before it stay
    /// queued.
    pub fn enqueue_guarded(
        &self,
        allowed: &[CommandCandidate],
        requested_by: &str,
        client_hint: Option<&str>,
    ) -> Result<Vec<QueuedCommand>> {
        log_op_start!("enqueue_guarded", allowed_len = allowed.len());
        let start = std::time::Instant::now();

        let mut queued = Vec::with_capacity(allowed.len());
        for candidate in allowed {
            let Some(spec) = self.routes.get(&candidate.route) else {
                tracing::warn!(route = candidate.route.as_str(), "skipping unregistered route");
                continue;
            };

            let reason: String = candidate
                .reason
                .as_deref()
                .unwrap_or_default()
                .chars()
                .take(MAX_REASON_CHARS)
                .collect();
            let metadata = Metadata::new()
                .with("requested_by", requested_by)
                .with(
                    "client_hint",
                    client_hint.map_or(Value::Null, Value::from),
                )
                .with(REASON_METADATA_KEY, reason);

            let command = self.store.enqueue(NewCommand {
                route: spec.path.to_string(),
                category: spec.category.to_string(),
                action: spec.action.to_string(),
                payload: candidate.payload.clone(),
                priority: candidate
                    .priority
                    .unwrap_or(0)
                    .clamp(PRIORITY_MIN, PRIORITY_MAX),
                metadata,
            })?;
            queued.push(QueuedCommand::from(&command));
        }

        log_op_end!(
            "enqueue_guarded",
            duration_ms = ms_since(start),
            queued = queued.len()
        );
        Ok(queued)
    }
}

impl CommandGuard for CommandGateway {
    fn apply_command_guards(
        &self,
        commands: Vec<CommandCandidate>,
        safety: &SafetyInput,
    ) -> GuardResult {
        log_op_start!("apply_command_guards", commands = commands.len());
        let start = std::time::Instant::now();

        let mut rejected = Vec::new();
        let mut valid = Vec::with_capacity(commands.len());
        for command in commands {
            let report = self.validate_queued_payload(&command.route, &command.payload);
            if report.ok {
                valid.push(command);
            } else {
                rejected.push(BlockedCommand {
                    route: command.route,
                    reason: VALIDATION_FAILED_REASON.to_string(),
                    risk: None,
                    details: Some(report.errors),
                    payload: command.payload,
                });
            }
        }

        let outcome = self.safety.filter(valid, self.classifier.as_ref(), safety);
        let mut blocked = outcome.blocked;
        blocked.extend(rejected);
        let result = GuardResult {
            policy: outcome
                .policy
                .unwrap_or_else(|| normalize_safety_policy(safety)),
            allowed: outcome.allowed,
            blocked,
        };

        log_op_end!(
            "apply_command_guards",
            duration_ms = ms_since(start),
            allowed_len = result.allowed.len(),
            blocked_len = result.blocked.len()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::InMemoryCommandStore;
    use serde_json::json;

    fn gateway() -> (CommandGateway, Arc<InMemoryCommandStore>) {
        let store = Arc::new(InMemoryCommandStore::default());
        (CommandGateway::new(store.clone()), store)
    }

    #[test]
    fn test_from_body_keeps_whole_body_as_payload() {
        let request = QueueRequest::from_body(&json!({
            "priority": "7",
            "metadata": {"source": "ui"},
            "client_hint": "c4d-live",
            "name": "Hero",
        }));
        assert_eq!(request.priority, Some(json!("7")));
        assert_eq!(request.metadata.get("source"), Some(&json!("ui")));
        assert_eq!(request.payload.len(), 4);
    }

    #[test]
    fn test_falsy_client_hint_becomes_null() {
        assert_eq!(truthy(Some(&json!(""))), None);
        assert_eq!(truthy(Some(&json!(0))), None);
        assert_eq!(truthy(Some(&json!("live"))), Some(json!("live")));
    }

    #[test]
    fn test_queue_response_shapes() {
        let err: QueueResponse = Err(NovaError::RouteNotFound {
            route: "/nope".to_string(),
        })
        .into();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"status": "error", "error": "route spec not found"})
        );

        let err: QueueResponse = Err(NovaError::ValidationFailed {
            route: "/nova4d/material/assign".to_string(),
            errors: vec!["missing required field: target_name".to_string()],
        })
        .into();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "status": "error",
                "error": "payload validation failed",
                "route": "/nova4d/material/assign",
                "details": ["missing required field: target_name"],
            })
        );
    }

    #[test]
    fn test_enqueue_guarded_skips_unknown_routes() {
        let (gateway, store) = gateway();
        let allowed = vec![
            CommandCandidate::new("/nova4d/test/ping", Payload::new()).with_reason("ping"),
            CommandCandidate::new("/nova4d/unknown", Payload::new()),
        ];

        let queued = gateway
            .enqueue_guarded(&allowed, "workflow:spawn_cube", Some("cinema4d-live"))
            .unwrap();
        assert_eq!(queued.len(), 1);

        let command = store.get(&queued[0].id).unwrap();
        assert_eq!(command.metadata.get("assistant_reason"), Some(&json!("ping")));
        assert_eq!(
            command.metadata.get("requested_by"),
            Some(&json!("workflow:spawn_cube"))
        );
        assert_eq!(command.action, "test-ping");
    }

    #[test]
    fn test_enqueue_guarded_truncates_reason() {
        let (gateway, store) = gateway();
        let long_reason = "r".repeat(MAX_REASON_CHARS + 50);
        let allowed = vec![CommandCandidate::new("/nova4d/test/ping", Payload::new())
            .with_reason(long_reason.as_str())];

        let queued = gateway.enqueue_guarded(&allowed, "api", None).unwrap();
        let command = store.get(&queued[0].id).unwrap();
        let reason = command.metadata.get(REASON_METADATA_KEY).unwrap();
        assert_eq!(reason.as_str().map(str::len), Some(MAX_REASON_CHARS));
        assert_eq!(command.metadata.get("client_hint"), Some(&Value::Null));
    }
}
