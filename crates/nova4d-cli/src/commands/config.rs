//! Config command
//!
//! Usage: nova4d [--config <FILE>] config
//!
//! Prints the effective configuration, defaults filled in, as TOML.

use anyhow::Result;
use nova4d_core::NovaConfig;

pub fn execute(config: &NovaConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
