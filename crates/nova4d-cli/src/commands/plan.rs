//! Plan command
//!
//! Usage: nova4d plan <WORKFLOW_ID> [--options <JSON>] [--safety-mode <MODE>]
//!        [--allow-dangerous] [--max-commands <N>]

use anyhow::{bail, Result};
use clap::Args;
use nova4d_core::workflow::{PlanResponse, WorkflowPlanner};
use nova4d_core::{CommandGateway, InMemoryCommandStore, NovaConfig};
use std::sync::Arc;

use super::{print_json, PlanInput};

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: PlanInput,
}

pub fn execute(args: PlanArgs, config: &NovaConfig) -> Result<()> {
    let input = args.input;
    let options = input.options()?;
    let store = Arc::new(InMemoryCommandStore::new(config.queue.clone()));
    let gateway = CommandGateway::new(store);
    let planner = WorkflowPlanner::with_config(&gateway, &config.planner);

    let result = planner.build_workflow_plan(
        &input.workflow_id,
        &options,
        &input.safety(config),
        input.max_commands().as_ref(),
    );
    let response = PlanResponse::from_result(&input.workflow_id, result);
    print_json(&response)?;

    if let PlanResponse::Failed { error, .. } = response {
        bail!(error);
    }
    Ok(())
}
