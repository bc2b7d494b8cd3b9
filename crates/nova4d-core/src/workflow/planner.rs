//! Workflow planning
//!
//! Planning resolves a workflow id, normalizes options, expands the template
//! sequence, caps it to a prefix and hands it to a [`CommandGuard`]. Nothing
//! is queued here; [`WorkflowPlan::enqueue`] does that explicitly.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::coerce::parse_integer;
use crate::config::PlannerConfig;
use crate::errors::{NovaError, Result};
use crate::gateway::{CommandGateway, CommandGuard, GuardResult, QueuedCommand};
use crate::model::CommandCandidate;
use crate::policy::SafetyInput;
use crate::{log_op_end, log_op_error, log_op_start};

use super::catalog::{WorkflowId, WorkflowSpec};
use super::options::{workflow_defaults, WorkflowOptions};
use super::templates::build_workflow_commands;

/// Hard ceiling on commands per plan
pub const MAX_PLAN_COMMANDS: i64 = 100;
/// Client hint stamped on commands queued from a plan
pub const DEFAULT_CLIENT_HINT: &str = "cinema4d-live";

/// A guarded, not yet queued workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowPlan {
    pub workflow: &'static WorkflowSpec,
    pub options: WorkflowOptions,
    pub guarded: GuardResult,
    pub max_commands: usize,
}

/// Commands queued from a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowRun {
    #[serde(flatten)]
    pub plan: WorkflowPlan,
    pub queued_count: usize,
    pub queued: Vec<QueuedCommand>,
}

impl WorkflowPlan {
    pub fn id(&self) -> WorkflowId {
        self.workflow.id
    }

    /// Queue the plan's allowed commands through `gateway`
    ///
    /// `requested_by` defaults to `workflow:<id>`, `client_hint` to
    /// [`DEFAULT_CLIENT_HINT`]. Blocked commands are never queued.
    ///
    /// # Errors
    ///
    /// Propagates store failures from [`CommandGateway::enqueue_guarded`].
    pub fn enqueue(
        self,
        gateway: &CommandGateway,
        requested_by: Option<&str>,
        client_hint: Option<&str>,
    ) -> Result<WorkflowRun> {
        let requested_by = requested_by
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| format!("workflow:{}", self.id()), str::to_string);
        let client_hint = client_hint
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_CLIENT_HINT);

        let queued = gateway.enqueue_guarded(&self.guarded.allowed, &requested_by, Some(client_hint))?;
        Ok(WorkflowRun {
            plan: self,
            queued_count: queued.len(),
            queued,
        })
    }
}

/// Wire shape of a planning call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlanResponse {
    Planned {
        ok: bool,
        workflow: &'static WorkflowSpec,
        options: WorkflowOptions,
        guarded: GuardResult,
        max_commands: usize,
    },
    Failed {
        ok: bool,
        error: String,
        workflow_id: String,
    },
}

impl PlanResponse {
    pub fn from_result(workflow_id: &str, result: Result<WorkflowPlan>) -> Self {
        match result {
            Ok(plan) => PlanResponse::Planned {
                ok: true,
                workflow: plan.workflow,
                options: plan.options,
                guarded: plan.guarded,
                max_commands: plan.max_commands,
            },
            Err(e) => PlanResponse::Failed {
                ok: false,
                error: match e {
                    NovaError::WorkflowNotFound { .. } => "workflow not found".to_string(),
                    NovaError::EmptyWorkflow { .. } => {
                        "workflow produced no commands".to_string()
                    }
                    other => other.to_string(),
                },
                workflow_id: workflow_id.to_string(),
            },
        }
    }
}

/// Expands workflows and guards them
#[derive(Debug, Clone)]
pub struct WorkflowPlanner<G> {
    guard: G,
    default_max_commands: i64,
}

impl<G: CommandGuard> WorkflowPlanner<G> {
    pub fn new(guard: G) -> Self {
        Self::with_config(guard, &PlannerConfig::default())
    }

    pub fn with_config(guard: G, config: &PlannerConfig) -> Self {
        Self {
            guard,
            default_max_commands: (config.default_max_commands as i64)
                .clamp(1, MAX_PLAN_COMMANDS),
        }
    }

    pub fn guard(&self) -> &G {
        &self.guard
    }

    /// Build a guarded plan for `workflow_id`
    ///
    /// `max_commands` is parsed loosely, clamped to `[1, 100]` and keeps a
    /// prefix of the sequence, since later steps depend on earlier ones.
    ///
    /// # Errors
    ///
    /// `WorkflowNotFound` for unknown ids, `EmptyWorkflow` when nothing is
    /// left to guard.
    pub fn build_workflow_plan(
        &self,
        workflow_id: &str,
        options: &Map<String, Value>,
        safety: &SafetyInput,
        max_commands: Option<&Value>,
    ) -> Result<WorkflowPlan> {
        log_op_start!("build_workflow_plan", workflow_id = workflow_id);
        let start = std::time::Instant::now();

        let result = self.plan(workflow_id, options, safety, max_commands);

        match &result {
            Ok(plan) => {
                log_op_end!(
                    "build_workflow_plan",
                    duration_ms = start.elapsed().as_millis() as u64,
                    workflow_id = workflow_id,
                    max_commands = plan.max_commands,
                    allowed_len = plan.guarded.allowed.len(),
                    blocked_len = plan.guarded.blocked.len()
                );
            }
            Err(e) => log_op_error!(
                "build_workflow_plan",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            ),
        }
        result
    }

    fn plan(
        &self,
        workflow_id: &str,
        options: &Map<String, Value>,
        safety: &SafetyInput,
        max_commands: Option<&Value>,
    ) -> Result<WorkflowPlan> {
        let id: WorkflowId = workflow_id.parse()?;
        let options = workflow_defaults(options);
        let cap = parse_integer(max_commands, self.default_max_commands, 1, MAX_PLAN_COMMANDS);
        // cap is in [1, 100]
        let max_commands = cap as usize;

        let mut templates = build_workflow_commands(id, &options);
        templates.truncate(max_commands);
        if templates.is_empty() {
            return Err(NovaError::EmptyWorkflow {
                workflow_id: workflow_id.to_string(),
            });
        }

        let candidates: Vec<CommandCandidate> =
            templates.into_iter().map(CommandCandidate::from).collect();
        let guarded = self.guard.apply_command_guards(candidates, safety);

        Ok(WorkflowPlan {
            workflow: id.spec(),
            options,
            guarded,
            max_commands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::InMemoryCommandStore;
    use crate::policy::normalize_safety_policy;
    use serde_json::json;
    use std::sync::Arc;

    struct PassThrough;

    impl CommandGuard for PassThrough {
        fn apply_command_guards(
            &self,
            commands: Vec<CommandCandidate>,
            safety: &SafetyInput,
        ) -> GuardResult {
            GuardResult {
                policy: normalize_safety_policy(safety),
                allowed: commands,
                blocked: Vec::new(),
            }
        }
    }

    #[test]
    fn test_cap_keeps_prefix() {
        let planner = WorkflowPlanner::new(PassThrough);
        let plan = planner
            .build_workflow_plan("cinematic_smoke", &Map::new(), &SafetyInput::default(), Some(&json!(3)))
            .unwrap();
        let routes: Vec<&str> = plan.guarded.allowed.iter().map(|c| c.route.as_str()).collect();
        assert_eq!(
            routes,
            vec![
                "/nova4d/scene/spawn-object",
                "/nova4d/mograph/cloner/create",
                "/nova4d/material/create-redshift",
            ]
        );
        assert_eq!(plan.max_commands, 3);
    }

    #[test]
    fn test_max_commands_is_clamped() {
        let planner = WorkflowPlanner::new(PassThrough);
        let safety = SafetyInput::default();

        let plan = planner
            .build_workflow_plan("full_smoke", &Map::new(), &safety, Some(&json!(0)))
            .unwrap();
        assert_eq!(plan.max_commands, 1);

        let plan = planner
            .build_workflow_plan("full_smoke", &Map::new(), &safety, Some(&json!("5000")))
            .unwrap();
        assert_eq!(plan.max_commands, 100);
        assert_eq!(plan.guarded.allowed.len(), 7);

        let plan = planner
            .build_workflow_plan("full_smoke", &Map::new(), &safety, None)
            .unwrap();
        assert_eq!(plan.max_commands, 20);
    }

    #[test]
    fn test_unknown_workflow_response() {
        let planner = WorkflowPlanner::new(PassThrough);
        let result =
            planner.build_workflow_plan("not-a-workflow", &Map::new(), &SafetyInput::default(), None);
        let response = PlanResponse::from_result("not-a-workflow", result);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"ok": false, "error": "workflow not found", "workflow_id": "not-a-workflow"})
        );
    }

    #[test]
    fn test_planned_response_shape() {
        let planner = WorkflowPlanner::new(PassThrough);
        let result =
            planner.build_workflow_plan("spawn_cube", &Map::new(), &SafetyInput::default(), None);
        let json = serde_json::to_value(PlanResponse::from_result("spawn_cube", result)).unwrap();

        assert_eq!(json["ok"], json!(true));
        assert_eq!(json["workflow"]["id"], json!("spawn_cube"));
        assert_eq!(json["options"]["object_name"], json!("WorkflowCube"));
        assert_eq!(json["max_commands"], json!(20));
        assert_eq!(json["guarded"]["policy"]["mode"], json!("balanced"));
    }

    #[test]
    fn test_enqueue_stamps_workflow_caller() {
        let store = Arc::new(InMemoryCommandStore::default());
        let gateway = CommandGateway::new(store.clone());
        let planner = WorkflowPlanner::new(&gateway);

        let plan = planner
            .build_workflow_plan("redshift_material", &Map::new(), &SafetyInput::default(), None)
            .unwrap();
        let run = plan.enqueue(&gateway, None, None).unwrap();

        assert_eq!(run.queued_count, 3);
        let command = store.get(&run.queued[0].id).unwrap();
        assert_eq!(
            command.metadata.get("requested_by"),
            Some(&json!("workflow:redshift_material"))
        );
        assert_eq!(command.metadata.get("client_hint"), Some(&json!("cinema4d-live")));
        assert_eq!(
            command.metadata.get("assistant_reason"),
            Some(&json!("Create workflow base cube."))
        );
    }
}
