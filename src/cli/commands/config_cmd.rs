//! Configuration display command.

use std::path::Path;

use crate::cli::icons::Mark;
use crate::config::HarvestConfig;

/// Print the effective configuration as TOML.
pub fn cmd_config_show(config: &HarvestConfig, source: Option<&Path>) -> anyhow::Result<()> {
    match source {
        Some(path) => eprintln!("{} Config file: {}", Mark::Aside, path.display()),
        None => eprintln!("{} No config file, using defaults", Mark::Aside),
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
