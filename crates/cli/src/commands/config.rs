//! Credential config commands

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::output::{print_item, ConfigDisplay, OutputFormat};
use ocipower_common::ConfigLocation;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the loaded credential profile (pass phrase redacted)
    Show,
}

pub fn execute(cmd: ConfigCommands, location: &ConfigLocation, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = location
                .load()
                .with_context(|| format!("loading profile '{}'", location.profile))?;
            print_item(&ConfigDisplay::from(&config), format)?;
        }
    }

    Ok(())
}
