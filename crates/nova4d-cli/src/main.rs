//! Nova4D CLI
//!
//! Drives the admission gateway and workflow planner in-process

use clap::{Parser, Subcommand};
use nova4d_core::{ExError, NovaError};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "nova4d")]
#[command(about = "Nova4D - command admission and workflow planning", long_about = None)]
struct Cli {
    /// TOML config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List registered routes with their payload rules
    Routes(commands::routes::RoutesArgs),
    /// List built-in workflows and default options
    Workflows(commands::workflows::WorkflowsArgs),
    /// Validate a payload against a route's rules
    Validate(commands::validate::ValidateArgs),
    /// Admit a single command onto an in-memory queue
    Queue(commands::queue::QueueArgs),
    /// Preview a guarded workflow plan
    Plan(commands::plan::PlanArgs),
    /// Plan a workflow and queue its allowed commands
    Run(commands::run::RunArgs),
    /// Print the effective configuration as TOML
    Config,
}

impl Commands {
    fn op(&self) -> &'static str {
        match self {
            Commands::Routes(_) => "routes",
            Commands::Workflows(_) => "workflows",
            Commands::Validate(_) => "validate",
            Commands::Queue(_) => "queue",
            Commands::Plan(_) => "plan",
            Commands::Run(_) => "run",
            Commands::Config => "config",
        }
    }
}

/// Domain errors print with their stable code; anything else as a context chain
fn render_error(op: &str, err: &anyhow::Error) -> String {
    match err.downcast_ref::<NovaError>() {
        Some(nova) if err.chain().count() == 1 => {
            ExError::from(nova.clone()).with_op(op).to_string()
        }
        _ => format!("{:#}", err),
    }
}

fn main() {
    let cli = Cli::parse();
    let op = cli.command.op();

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| {
        nova4d_core::logging_facility::init(config.logging.profile);
        match cli.command {
            Commands::Routes(args) => commands::routes::execute(args),
            Commands::Workflows(args) => commands::workflows::execute(args),
            Commands::Validate(args) => commands::validate::execute(args),
            Commands::Queue(args) => commands::queue::execute(args, &config),
            Commands::Plan(args) => commands::plan::execute(args, &config),
            Commands::Run(args) => commands::run::execute(args, &config),
            Commands::Config => commands::config::execute(&config),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", render_error(op, &e));
        std::process::exit(1);
    }
}
