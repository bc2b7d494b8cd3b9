//! Validate command
//!
//! Usage: nova4d validate <ROUTE> [--payload <JSON>]

use anyhow::{bail, Context, Result};
use clap::Args;
use nova4d_core::rules::RuleValidator;
use nova4d_core::RouteRegistry;
use serde_json::Value;

use super::print_json;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Route path, e.g. /nova4d/scene/spawn-object
    pub route: String,

    /// Payload JSON; anything but an object fails validation
    #[arg(short, long, default_value = "{}")]
    pub payload: String,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    RouteRegistry::global().resolve(&args.route)?;
    let payload: Value =
        serde_json::from_str(&args.payload).context("--payload is not valid JSON")?;

    let report = RuleValidator::new().validate_value(&args.route, &payload);
    print_json(&report)?;
    if !report.ok {
        bail!("payload validation failed");
    }
    Ok(())
}
