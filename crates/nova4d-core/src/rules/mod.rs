pub mod route_rules;
pub mod validation;

pub use route_rules::{has_rule, risk_for, rule_for, RouteRule, DEFAULT_RULE};
pub use validation::{
    check_rule, describe_routes, CatalogEntry, PayloadValidator, RuleValidator, ValidationReport,
};
