//! Payload validation against route rules

use serde::Serialize;
use serde_json::Value;

use crate::model::Payload;
use crate::policy::RiskLevel;
use crate::routes::RouteRegistry;

use super::route_rules::{rule_for, RouteRule};

/// Outcome of validating one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Schema check for a route's payload
pub trait PayloadValidator: Send + Sync {
    fn validate(&self, route: &str, payload: &Payload) -> ValidationReport;
}

/// Validator backed by the static route rule table
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate an arbitrary JSON value; anything but an object is rejected
    pub fn validate_value(&self, route: &str, payload: &Value) -> ValidationReport {
        match payload {
            Value::Object(map) => self.validate(route, &Payload::from(map.clone())),
            _ => ValidationReport::from_errors(vec!["payload must be an object".to_string()]),
        }
    }
}

impl PayloadValidator for RuleValidator {
    fn validate(&self, route: &str, payload: &Payload) -> ValidationReport {
        ValidationReport::from_errors(check_rule(rule_for(route), payload))
    }
}

/// Collect every violation of `rule`, in rule order
pub fn check_rule(rule: &RouteRule, payload: &Payload) -> Vec<String> {
    let mut errors = Vec::new();

    for key in rule.required {
        if !payload.contains_key(key) {
            errors.push(format!("missing required field: {}", key));
        }
    }

    for group in rule.any_of {
        if !group.iter().any(|key| payload.contains_key(key)) {
            errors.push(format!("one of [{}] is required", group.join(", ")));
        }
    }

    if !rule.at_least_one_of.is_empty()
        && !rule
            .at_least_one_of
            .iter()
            .any(|key| payload.contains_key(key))
    {
        errors.push(format!(
            "at least one of [{}] is required",
            rule.at_least_one_of.join(", ")
        ));
    }

    errors
}

/// One row of the route catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub path: &'static str,
    pub category: &'static str,
    pub action: &'static str,
    pub description: &'static str,
    pub risk: RiskLevel,
    pub required: &'static [&'static str],
    pub any_of: &'static [&'static [&'static str]],
    pub at_least_one_of: &'static [&'static str],
    pub optional: &'static [&'static str],
}

/// Describe every registered route with its rule, in registry order
pub fn describe_routes(registry: &RouteRegistry) -> Vec<CatalogEntry> {
    registry
        .iter()
        .map(|spec| {
            let rule = rule_for(spec.path);
            CatalogEntry {
                path: spec.path,
                category: spec.category,
                action: spec.action,
                description: rule.description,
                risk: rule.risk,
                required: rule.required,
                any_of: rule.any_of,
                at_least_one_of: rule.at_least_one_of,
                optional: rule.optional,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_required_fields_reported_in_order() {
        let report = RuleValidator.validate("/nova4d/material/assign", &Payload::new());
        assert!(!report.ok);
        assert_eq!(
            report.errors,
            vec![
                "missing required field: target_name".to_string(),
                "missing required field: material_name".to_string(),
            ]
        );
    }

    #[test]
    fn test_any_of_and_at_least_one_of() {
        let report = RuleValidator.validate("/nova4d/scene/set-transform", &Payload::new());
        assert_eq!(
            report.errors,
            vec![
                "one of [target_name, target_path] is required".to_string(),
                "at least one of [position, rotation, scale] is required".to_string(),
            ]
        );

        let payload = Payload::new()
            .with("target_path", "Root/Cube")
            .with("scale", json!([2, 2, 2]));
        assert!(RuleValidator
            .validate("/nova4d/scene/set-transform", &payload)
            .ok);
    }

    #[test]
    fn test_null_value_counts_as_present() {
        let payload = Payload::new()
            .with("target_name", Value::Null)
            .with("material_name", "M");
        assert!(RuleValidator.validate("/nova4d/material/assign", &payload).ok);
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let report = RuleValidator.validate_value("/nova4d/test/ping", &json!([1, 2]));
        assert_eq!(report.errors, vec!["payload must be an object".to_string()]);
    }

    #[test]
    fn test_describe_routes_covers_registry() {
        let registry = RouteRegistry::builtin();
        let catalog = describe_routes(&registry);
        assert_eq!(catalog.len(), registry.len());

        let assign = catalog
            .iter()
            .find(|entry| entry.path == "/nova4d/material/assign")
            .unwrap();
        assert_eq!(assign.category, "material");
        assert_eq!(assign.required, &["target_name", "material_name"]);
    }
}
