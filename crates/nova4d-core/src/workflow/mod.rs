//! Named workflows: catalog, option normalization, templates and planning

pub mod catalog;
pub mod options;
pub mod planner;
pub mod templates;

pub use catalog::{find_workflow, workflow_specs, WorkflowId, WorkflowSpec};
pub use options::{workflow_defaults, WorkflowOptions};
pub use planner::{PlanResponse, WorkflowPlan, WorkflowPlanner, WorkflowRun};
pub use templates::{build_workflow_commands, build_workflow_commands_by_id, CommandTemplate};
