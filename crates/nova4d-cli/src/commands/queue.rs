//! Queue command
//!
//! Usage: nova4d queue <ROUTE> [--body <JSON>] [--requested-by <CALLER>]
//!
//! Admits one command the way a transport would: the body doubles as the
//! payload and carries `priority`, `metadata` and `client_hint`.

use anyhow::{bail, Context, Result};
use clap::Args;
use nova4d_core::{
    CommandGateway, InMemoryCommandStore, NovaConfig, Payload, QueueRequest, QueueResponse,
    RequestContext,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::print_json;

#[derive(Debug, Args)]
pub struct QueueArgs {
    /// Route path, e.g. /nova4d/scene/spawn-object
    pub route: String,

    /// Request body as JSON
    #[arg(short, long, default_value = "{}")]
    pub body: String,

    /// Caller recorded as `requested_by` (default: api)
    #[arg(long)]
    pub requested_by: Option<String>,
}

pub fn execute(args: QueueArgs, config: &NovaConfig) -> Result<()> {
    let body: Value = serde_json::from_str(&args.body).context("--body is not valid JSON")?;
    let store = Arc::new(InMemoryCommandStore::new(config.queue.clone()));
    let gateway = CommandGateway::new(store.clone());

    let mut ctx = RequestContext::new();
    if let Some(caller) = args.requested_by {
        ctx = ctx.with_requested_by(caller);
    }

    let result = gateway.queue_command(
        &args.route,
        QueueRequest::from_body(&body),
        Payload::new(),
        &ctx,
    );
    let command = result
        .as_ref()
        .ok()
        .and_then(|ack| store.get(&ack.command_id));
    let response = QueueResponse::from(result);
    print_json(&json!({ "response": &response, "command": command }))?;

    if let QueueResponse::Error { error, .. } = response {
        bail!(error);
    }
    Ok(())
}
