pub mod config;
pub mod list;
pub mod sweep;

use crate::config::Config;
use crate::utils::{Result, SweepError};

/// Picks the project from the CLI flag or the configured default.
pub fn resolve_project(config: &Config, cli_project: Option<&str>) -> Result<String> {
    cli_project
        .map(str::to_string)
        .or_else(|| config.remote.project.clone())
        .ok_or_else(|| {
            SweepError::invalid_args(
                "no project given; pass --project or configure a default with 'glsweep config'",
            )
        })
}

/// Picks the classification target from the CLI flag or the configured default.
pub fn resolve_target(config: &Config, cli_target: Option<&str>) -> Option<String> {
    cli_target
        .map(str::to_string)
        .or_else(|| config.sweep.default_target.clone())
}
