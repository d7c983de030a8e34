pub mod commands;
pub mod parser;

pub use parser::{Cli, Commands};

use crate::config::ConfigManager;
use crate::core::SweepMode;
use crate::utils::{Result, SweepError};

pub fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config(args) => commands::config::execute(args),
        Commands::List(args) => {
            let config = load_config()?;
            commands::list::execute(config, args)
        }
        Commands::Delete(args) => {
            let config = load_config()?;
            commands::sweep::execute(config, args, SweepMode::Delete)
        }
        Commands::Archive(args) => {
            let config = load_config()?;
            commands::sweep::execute(config, args, SweepMode::Archive)
        }
    }
}

fn load_config() -> Result<crate::config::Config> {
    ConfigManager::load_or_create()
        .map_err(|e| SweepError::config_error(format!("Failed to load config: {}", e)))
}
