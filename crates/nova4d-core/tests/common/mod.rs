use nova4d_core::errors::{NovaError, Result};
use nova4d_core::model::{Command, CommandCandidate, NewCommand, Payload};
use nova4d_core::ops::{CommandStore, InMemoryCommandStore};
use nova4d_core::policy::{
    BlockedCommand, RiskClassifier, SafetyFilter, SafetyInput, SafetyOutcome, SafetyPolicy,
};
use nova4d_core::rules::{PayloadValidator, ValidationReport};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store wrapper counting enqueue calls
#[allow(dead_code)]
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryCommandStore,
    calls: AtomicUsize,
    fail: bool,
}

#[allow(dead_code)]
impl CountingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CommandStore for CountingStore {
    fn enqueue(&self, command: NewCommand) -> Result<Command> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NovaError::Internal {
                message: "store unavailable".to_string(),
            });
        }
        self.inner.enqueue(command)
    }
}

/// Validator rejecting a fixed set of routes
#[allow(dead_code)]
pub struct RejectRoutes(pub Vec<&'static str>);

impl PayloadValidator for RejectRoutes {
    fn validate(&self, route: &str, _payload: &Payload) -> ValidationReport {
        if self.0.contains(&route) {
            ValidationReport {
                ok: false,
                errors: vec![format!("rejected: {}", route)],
                warnings: Vec::new(),
            }
        } else {
            ValidationReport {
                ok: true,
                ..ValidationReport::default()
            }
        }
    }
}

/// Safety filter blocking a fixed set of routes, optionally without a policy
#[allow(dead_code)]
pub struct BlockRoutes {
    pub routes: Vec<&'static str>,
    pub policy: Option<SafetyPolicy>,
}

impl SafetyFilter for BlockRoutes {
    fn filter(
        &self,
        commands: Vec<CommandCandidate>,
        _classifier: &dyn RiskClassifier,
        _input: &SafetyInput,
    ) -> SafetyOutcome {
        let (blocked, allowed): (Vec<_>, Vec<_>) = commands
            .into_iter()
            .partition(|c| self.routes.contains(&c.route.as_str()));
        SafetyOutcome {
            policy: self.policy,
            allowed,
            blocked: blocked
                .into_iter()
                .map(|c| BlockedCommand {
                    route: c.route,
                    reason: "blocked by test filter".to_string(),
                    risk: None,
                    details: None,
                    payload: c.payload,
                })
                .collect(),
        }
    }
}

/// JSON object literal as a map
#[allow(dead_code)]
pub fn obj(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

#[allow(dead_code)]
pub fn candidate(route: &str, payload: Value) -> CommandCandidate {
    CommandCandidate::new(route, Payload::from(obj(payload)))
}
