#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{candidate, BlockRoutes, CountingStore, RejectRoutes};
use nova4d_core::gateway::{CommandGateway, CommandGuard, VALIDATION_FAILED_REASON};
use nova4d_core::policy::{RiskLevel, SafetyInput, SafetyMode, SafetyPolicy};
use nova4d_core::CommandCandidate;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn builtin_gateway() -> (CommandGateway, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::default());
    (CommandGateway::new(store.clone()), store)
}

#[test]
fn test_validation_runs_before_safety_and_is_listed_last() {
    let (gateway, store) = builtin_gateway();
    let gateway = gateway
        .with_validator(Arc::new(RejectRoutes(vec!["/nova4d/scene/set-transform"])))
        .with_safety_filter(Arc::new(BlockRoutes {
            routes: vec!["/nova4d/render/frame", "/nova4d/scene/set-transform"],
            policy: None,
        }));

    let commands = vec![
        candidate("/nova4d/scene/set-transform", json!({})),
        candidate("/nova4d/test/ping", json!({})),
        candidate("/nova4d/render/frame", json!({"frame": 1})),
    ];
    let result = gateway.apply_command_guards(commands, &SafetyInput::new("strict", false));

    assert_eq!(result.allowed.len(), 1);
    assert_eq!(result.allowed[0].route, "/nova4d/test/ping");

    let blocked: Vec<(&str, &str)> = result
        .blocked
        .iter()
        .map(|b| (b.route.as_str(), b.reason.as_str()))
        .collect();
    assert_eq!(
        blocked,
        vec![
            ("/nova4d/render/frame", "blocked by test filter"),
            ("/nova4d/scene/set-transform", VALIDATION_FAILED_REASON),
        ]
    );
    assert_eq!(
        result.blocked[1].details,
        Some(vec!["rejected: /nova4d/scene/set-transform".to_string()])
    );
    assert_eq!(store.calls(), 0);
}

#[test]
fn test_policy_falls_back_to_normalized_input() {
    let (gateway, _store) = builtin_gateway();
    let gateway = gateway.with_safety_filter(Arc::new(BlockRoutes {
        routes: Vec::new(),
        policy: None,
    }));

    let result = gateway.apply_command_guards(Vec::new(), &SafetyInput::new(" Strict ", "true"));
    assert_eq!(
        result.policy,
        SafetyPolicy {
            mode: SafetyMode::Strict,
            allow_dangerous: false,
        }
    );
    assert!(result.allowed.is_empty());
    assert!(result.blocked.is_empty());
}

#[test]
fn test_builtin_policy_blocks_dangerous_in_balanced_mode() {
    let (gateway, _store) = builtin_gateway();
    let commands = vec![
        candidate("/nova4d/scene/delete-object", json!({"target_name": "Cube"})),
        candidate("/nova4d/render/frame", json!({})),
    ];

    let result = gateway.apply_command_guards(commands.clone(), &SafetyInput::default());
    assert_eq!(result.allowed.len(), 1);
    assert_eq!(result.blocked.len(), 1);
    assert_eq!(result.blocked[0].risk, Some(RiskLevel::Dangerous));
    assert_eq!(
        result.blocked[0].reason,
        "blocked dangerous action (set allow_dangerous=true to override)"
    );

    let result = gateway.apply_command_guards(commands.clone(), &SafetyInput::new("balanced", true));
    assert_eq!(result.allowed.len(), 2);

    let result = gateway.apply_command_guards(commands, &SafetyInput::new("strict", true));
    assert!(result.allowed.is_empty());
    assert_eq!(
        result.blocked[1].reason,
        "blocked by strict safety mode (moderate)"
    );
}

const ROUTES: [&str; 6] = [
    "/nova4d/test/ping",
    "/nova4d/scene/spawn-object",
    "/nova4d/scene/delete-object",
    "/nova4d/material/assign",
    "/nova4d/render/frame",
    "/nova4d/io/export/gltf",
];

fn arb_candidate() -> impl Strategy<Value = CommandCandidate> {
    (0..ROUTES.len(), any::<bool>(), 0u32..1000).prop_map(|(i, filled, tag)| {
        let payload = if filled {
            json!({
                "target_name": "Cube",
                "material_name": "Mat",
                "output_path": "/tmp/out.gltf",
                "tag": tag,
            })
        } else {
            json!({ "tag": tag })
        };
        candidate(ROUTES[i], payload)
    })
}

fn arb_safety() -> impl Strategy<Value = SafetyInput> {
    (
        prop::sample::select(vec!["strict", "balanced", "unrestricted", "bogus"]),
        any::<bool>(),
    )
        .prop_map(|(mode, allow)| SafetyInput::new(mode, allow))
}

proptest! {
    #[test]
    fn prop_guard_partitions_every_command(
        commands in prop::collection::vec(arb_candidate(), 0..24),
        safety in arb_safety(),
    ) {
        let (gateway, store) = builtin_gateway();
        let total = commands.len();
        let result = gateway.apply_command_guards(commands.clone(), &safety);

        prop_assert_eq!(result.allowed.len() + result.blocked.len(), total);
        prop_assert_eq!(store.calls(), 0);

        // allowed keeps input order
        let mut rest = commands.iter();
        for allowed in &result.allowed {
            prop_assert!(rest.any(|c| c == allowed));
        }

        // nothing is both allowed and blocked
        for blocked in &result.blocked {
            prop_assert!(!result
                .allowed
                .iter()
                .any(|a| a.route == blocked.route && a.payload == blocked.payload));
        }
    }
}
