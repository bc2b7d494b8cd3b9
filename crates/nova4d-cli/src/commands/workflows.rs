//! Workflows command
//!
//! Usage: nova4d workflows [--json]

use anyhow::Result;
use clap::Args;
use nova4d_core::workflow::{workflow_specs, WorkflowOptions};
use serde_json::json;

use super::print_json;

#[derive(Debug, Args)]
pub struct WorkflowsArgs {
    /// Print workflows and default options as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: WorkflowsArgs) -> Result<()> {
    if args.json {
        return print_json(&json!({
            "workflows": workflow_specs(),
            "defaults": WorkflowOptions::default(),
        }));
    }
    for spec in workflow_specs() {
        println!("{:<18} {:<22} {}", spec.id.as_str(), spec.name, spec.description);
    }
    Ok(())
}
