//! Plan command - the per-namespace handoff document of every environment

use clap::ValueEnum;
use galaxy_core::Galaxy;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

pub fn run(galaxy: &Galaxy, output: OutputFormat) -> Result<()> {
    let handoffs = galaxy.handoffs()?;

    let rendered = match output {
        OutputFormat::Yaml => serde_yaml::to_string(&handoffs).map_err(CliError::output)?,
        OutputFormat::Json => serde_json::to_string_pretty(&handoffs).map_err(CliError::output)?,
    };

    println!("{}", rendered.trim_end());
    Ok(())
}
