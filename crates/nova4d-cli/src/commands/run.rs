//! Run command
//!
//! Plans a workflow, queues its allowed commands on an in-memory queue and
//! optionally dispatches them to a named client.

use anyhow::Result;
use clap::Args;
use nova4d_core::workflow::WorkflowPlanner;
use nova4d_core::{CommandGateway, InMemoryCommandStore, NovaConfig};
use serde_json::json;
use std::sync::Arc;

use super::{print_json, PlanInput};

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: PlanInput,

    /// Caller recorded on queued commands (default: workflow:<id>)
    #[arg(long)]
    pub requested_by: Option<String>,

    /// Client hint recorded on queued commands
    #[arg(long)]
    pub client_hint: Option<String>,

    /// Dispatch the queued commands to this client id
    #[arg(long)]
    pub dispatch: Option<String>,
}

pub fn execute(args: RunArgs, config: &NovaConfig) -> Result<()> {
    let input = &args.input;
    let options = input.options()?;
    let store = Arc::new(InMemoryCommandStore::new(config.queue.clone()));
    let gateway = CommandGateway::new(store.clone());
    let planner = WorkflowPlanner::with_config(&gateway, &config.planner);

    let plan = planner.build_workflow_plan(
        &input.workflow_id,
        &options,
        &input.safety(config),
        input.max_commands().as_ref(),
    )?;
    let run = plan.enqueue(
        &gateway,
        args.requested_by.as_deref(),
        args.client_hint.as_deref(),
    )?;

    let dispatched = args
        .dispatch
        .as_deref()
        .map(|client| store.dispatch(client, None))
        .unwrap_or_default();

    print_json(&json!({
        "status": "ok",
        "run": run,
        "dispatched": dispatched,
        "queue": store.summary(),
    }))
}
