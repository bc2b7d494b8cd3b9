//! Subcommand implementations

pub mod config;
pub mod plan;
pub mod queue;
pub mod routes;
pub mod run;
pub mod validate;
pub mod workflows;

use anyhow::{bail, Context, Result};
use clap::Args;
use nova4d_core::policy::SafetyInput;
use nova4d_core::NovaConfig;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

pub fn load_config(path: Option<&Path>) -> Result<NovaConfig> {
    match path {
        Some(path) => NovaConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(NovaConfig::default()),
    }
}

/// Parse a JSON object argument; anything but an object is rejected
pub fn parse_object(raw: &str, what: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).with_context(|| format!("{what} is not valid JSON"))? {
        Value::Object(map) => Ok(map),
        _ => bail!("{what} must be a JSON object"),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Options shared by `plan` and `run`
#[derive(Debug, Args)]
pub struct PlanInput {
    /// Workflow id (see `nova4d workflows`)
    pub workflow_id: String,

    /// Workflow options as a JSON object
    #[arg(short, long)]
    pub options: Option<String>,

    /// Safety mode: strict, balanced or unrestricted
    #[arg(long)]
    pub safety_mode: Option<String>,

    /// Allow dangerous commands under balanced mode
    #[arg(long)]
    pub allow_dangerous: bool,

    /// Plan length cap (clamped to 1..=100)
    #[arg(short, long)]
    pub max_commands: Option<i64>,
}

impl PlanInput {
    pub fn options(&self) -> Result<Map<String, Value>> {
        self.options
            .as_deref()
            .map_or_else(|| Ok(Map::new()), |raw| parse_object(raw, "--options"))
    }

    /// CLI flags override the config's `[safety]` section
    pub fn safety(&self, config: &NovaConfig) -> SafetyInput {
        let mut safety = config.safety.clone();
        if let Some(mode) = &self.safety_mode {
            safety.mode = Some(Value::from(mode.as_str()));
        }
        if self.allow_dangerous {
            safety.allow_dangerous = Some(Value::Bool(true));
        }
        safety
    }

    pub fn max_commands(&self) -> Option<Value> {
        self.max_commands.map(Value::from)
    }
}
