//! Routes command
//!
//! Usage: nova4d routes [--category <CATEGORY>] [--json]

use anyhow::{bail, Result};
use clap::Args;
use nova4d_core::rules::describe_routes;
use nova4d_core::RouteRegistry;

use super::print_json;

#[derive(Debug, Args)]
pub struct RoutesArgs {
    /// Only list routes in this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: RoutesArgs) -> Result<()> {
    let registry = RouteRegistry::global();
    if let Some(category) = args.category.as_deref() {
        let known = registry.categories();
        if !known.contains(&category) {
            bail!("unknown category '{}' (known: {})", category, known.join(", "));
        }
    }

    let catalog: Vec<_> = describe_routes(registry)
        .into_iter()
        .filter(|entry| args.category.as_deref().map_or(true, |c| entry.category == c))
        .collect();

    if args.json {
        return print_json(&catalog);
    }
    for entry in &catalog {
        println!("{:<10} {:<44} {}", entry.risk.as_str(), entry.path, entry.description);
    }
    Ok(())
}
