//! Risk classification and safety policy
//!
//! A [`RiskClassifier`] labels each candidate command; a [`SafetyFilter`]
//! turns the labels plus a caller-supplied [`SafetyInput`] into an
//! allowed/blocked split. The gateway depends only on the traits.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::string_option;
use crate::model::{CommandCandidate, Payload};
use crate::rules::risk_for;

/// Risk label attached to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Safe,
    Moderate,
    Dangerous,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Dangerous => "dangerous",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability to label a command with a risk level
pub trait RiskClassifier: Send + Sync {
    fn classify(&self, command: &CommandCandidate) -> RiskLevel;
}

/// Classifier reading the route rule table
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteRiskClassifier;

impl RiskClassifier for RouteRiskClassifier {
    fn classify(&self, command: &CommandCandidate) -> RiskLevel {
        risk_for(&command.route)
    }
}

/// Classifier that labels every command the same way
///
/// # Example
/// ```
/// use nova4d_core::model::{CommandCandidate, Payload};
/// use nova4d_core::policy::{FixedRiskClassifier, RiskClassifier, RiskLevel};
///
/// let classifier = FixedRiskClassifier(RiskLevel::Dangerous);
/// let command = CommandCandidate::new("/nova4d/test/ping", Payload::new());
/// assert_eq!(classifier.classify(&command), RiskLevel::Dangerous);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedRiskClassifier(pub RiskLevel);

impl RiskClassifier for FixedRiskClassifier {
    fn classify(&self, _command: &CommandCandidate) -> RiskLevel {
        self.0
    }
}

/// Safety settings as supplied by a caller, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_dangerous: Option<Value>,
}

impl SafetyInput {
    pub fn new(mode: impl Into<Value>, allow_dangerous: impl Into<Value>) -> Self {
        Self {
            mode: Some(mode.into()),
            allow_dangerous: Some(allow_dangerous.into()),
        }
    }

    /// Read `mode`/`allow_dangerous` out of a JSON value; non-objects are empty
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self {
                mode: map.get("mode").cloned(),
                allow_dangerous: map.get("allow_dangerous").cloned(),
            },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyMode {
    Strict,
    #[default]
    Balanced,
    Unrestricted,
}

impl SafetyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyMode::Strict => "strict",
            SafetyMode::Balanced => "balanced",
            SafetyMode::Unrestricted => "unrestricted",
        }
    }

    /// Case-insensitive, trimmed; unknown names are `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "strict" => Some(SafetyMode::Strict),
            "balanced" => Some(SafetyMode::Balanced),
            "unrestricted" => Some(SafetyMode::Unrestricted),
            _ => None,
        }
    }
}

/// Normalized safety policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SafetyPolicy {
    pub mode: SafetyMode,
    pub allow_dangerous: bool,
}

/// Normalize raw safety input
///
/// Unknown or missing modes become `balanced`. `allow_dangerous` is only
/// enabled by a literal boolean `true`; the string `"true"` does not count.
pub fn normalize_safety_policy(input: &SafetyInput) -> SafetyPolicy {
    let mode = SafetyMode::parse(&string_option(input.mode.as_ref(), "balanced"))
        .unwrap_or_default();
    SafetyPolicy {
        mode,
        allow_dangerous: matches!(input.allow_dangerous, Some(Value::Bool(true))),
    }
}

/// A command refused by the guard stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedCommand {
    pub route: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    #[serde(default)]
    pub payload: Payload,
}

/// Result of a safety filter pass
///
/// `policy` is `None` when the filter did not resolve one; callers fall back
/// to normalizing the raw input themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SafetyOutcome {
    pub policy: Option<SafetyPolicy>,
    pub allowed: Vec<CommandCandidate>,
    pub blocked: Vec<BlockedCommand>,
}

/// Splits candidates into allowed and blocked by risk
pub trait SafetyFilter: Send + Sync {
    fn filter(
        &self,
        commands: Vec<CommandCandidate>,
        classifier: &dyn RiskClassifier,
        input: &SafetyInput,
    ) -> SafetyOutcome;
}

/// Mode-driven filter
///
/// - `strict` blocks anything that is not `safe`
/// - `balanced` blocks `dangerous` unless `allow_dangerous`
/// - `unrestricted` allows everything
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicySafetyFilter;

impl PolicySafetyFilter {
    fn block_reason(policy: &SafetyPolicy, risk: RiskLevel) -> Option<String> {
        match policy.mode {
            SafetyMode::Strict if risk != RiskLevel::Safe => {
                Some(format!("blocked by strict safety mode ({})", risk))
            }
            SafetyMode::Balanced if risk == RiskLevel::Dangerous && !policy.allow_dangerous => {
                Some("blocked dangerous action (set allow_dangerous=true to override)".to_string())
            }
            _ => None,
        }
    }
}

impl SafetyFilter for PolicySafetyFilter {
    fn filter(
        &self,
        commands: Vec<CommandCandidate>,
        classifier: &dyn RiskClassifier,
        input: &SafetyInput,
    ) -> SafetyOutcome {
        let policy = normalize_safety_policy(input);
        let mut allowed = Vec::new();
        let mut blocked = Vec::new();

        for command in commands {
            let risk = classifier.classify(&command);
            match Self::block_reason(&policy, risk) {
                Some(reason) => blocked.push(BlockedCommand {
                    route: command.route,
                    reason,
                    risk: Some(risk),
                    details: None,
                    payload: command.payload,
                }),
                None => allowed.push(command),
            }
        }

        SafetyOutcome {
            policy: Some(policy),
            allowed,
            blocked,
        }
    }
}
